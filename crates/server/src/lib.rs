//! APIService Server
//!
//! Hosts `api.v1.APIService` over gRPC.

pub mod handler;
pub mod host;

pub use handler::PingHandler;
pub use host::{bind, method_label, shutdown_signal, ServiceHost};
