//! APIService Protocol Buffers
//!
//! Message types and tonic client/server bindings generated from `api.proto`,
//! plus the static descriptor table of `api.v1.APIService`.

pub mod descriptor;

pub use descriptor::{MessageType, MethodDescriptor, MethodKind, Route, ServiceDescriptor};

pub mod api {
    pub mod v1 {
        include!("api.v1.rs");

        use crate::descriptor::{MessageType, MethodDescriptor, MethodKind, ServiceDescriptor};

        impl prost::Name for PingRequest {
            const NAME: &'static str = "PingRequest";
            const PACKAGE: &'static str = "api.v1";
        }

        impl prost::Name for PingResponse {
            const NAME: &'static str = "PingResponse";
            const PACKAGE: &'static str = "api.v1";
        }

        /// Encoded `FileDescriptorSet` of `api.proto`, served by reflection
        pub const FILE_DESCRIPTOR_SET: &[u8] = include_bytes!("api.v1.bin");

        /// Key of the `Ping` method in [`API_SERVICE`]
        pub const PING: &str = "ping";

        const API_SERVICE_METHODS: &[(&str, MethodDescriptor)] = &[(
            PING,
            MethodDescriptor::new(
                "Ping",
                MessageType::of::<PingRequest>(),
                MessageType::of::<PingResponse>(),
                MethodKind::Unary,
            ),
        )];

        /// Descriptor table of `api.v1.APIService`
        pub static API_SERVICE: ServiceDescriptor = api_service();

        /// Build the `api.v1.APIService` descriptor
        pub const fn api_service() -> ServiceDescriptor {
            ServiceDescriptor::new(api_service_server::SERVICE_NAME, API_SERVICE_METHODS)
        }
    }
}

pub use api::v1::{PingRequest, PingResponse, API_SERVICE, FILE_DESCRIPTOR_SET};
