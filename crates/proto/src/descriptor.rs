//! Static service and method descriptors
//!
//! A descriptor is a plain, immutable table describing a remote-callable
//! service: its fully-qualified type name and, for every method, the wire
//! name, the input/output message types and the streaming discipline. A
//! generic runtime interprets these tables instead of per-method call code.

use std::any::TypeId;
use std::fmt;

/// Streaming discipline of an RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Exactly one request message and one response message
    Unary,

    /// One request message, a stream of response messages
    ServerStreaming,

    /// A stream of request messages, one response message
    ClientStreaming,

    /// Independent request and response streams
    BiDiStreaming,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            MethodKind::Unary => "unary",
            MethodKind::ServerStreaming => "server-streaming",
            MethodKind::ClientStreaming => "client-streaming",
            MethodKind::BiDiStreaming => "bidi-streaming",
        };
        f.write_str(kind)
    }
}

/// Reference to a schema-compiled message type
///
/// Holds the protobuf package and name of the message together with the
/// `TypeId` of the Rust struct generated for it.
#[derive(Clone, Copy)]
pub struct MessageType {
    package: &'static str,
    name: &'static str,
    type_id: fn() -> TypeId,
}

impl MessageType {
    /// Reference the generated message `M`
    pub const fn of<M: prost::Name + 'static>() -> Self {
        Self {
            package: M::PACKAGE,
            name: M::NAME,
            type_id: TypeId::of::<M>,
        }
    }

    /// Protobuf package, e.g. `api.v1`
    pub fn package(&self) -> &'static str {
        self.package
    }

    /// Unqualified protobuf message name, e.g. `PingRequest`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fully-qualified protobuf name, e.g. `api.v1.PingRequest`
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// Rust type of the generated message
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Whether this reference resolves to the Rust type `M`
    pub fn is<M: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<M>()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package
            && self.name == other.name
            && self.type_id() == other.type_id()
    }
}

impl Eq for MessageType {}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.full_name()).finish()
    }
}

/// Contract of a single RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: &'static str,
    input: MessageType,
    output: MessageType,
    kind: MethodKind,
}

impl MethodDescriptor {
    pub const fn new(
        name: &'static str,
        input: MessageType,
        output: MessageType,
        kind: MethodKind,
    ) -> Self {
        Self {
            name,
            input,
            output,
            kind,
        }
    }

    /// Wire name of the method, e.g. `Ping`
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn input(&self) -> MessageType {
        self.input
    }

    pub fn output(&self) -> MessageType {
        self.output
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }
}

/// Routing target of a method: the service type name and the method wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    pub service: &'static str,
    pub method: &'static str,
}

impl Route {
    /// gRPC request path, `/{service}/{method}`
    pub fn path(&self) -> String {
        format!("/{}/{}", self.service, self.method)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.service, self.method)
    }
}

/// Named table of method descriptors
///
/// Methods are kept in declaration order; lookups are linear, which is fine
/// for the handful of entries a service declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    type_name: &'static str,
    methods: &'static [(&'static str, MethodDescriptor)],
}

impl ServiceDescriptor {
    pub const fn new(
        type_name: &'static str,
        methods: &'static [(&'static str, MethodDescriptor)],
    ) -> Self {
        Self { type_name, methods }
    }

    /// Fully-qualified service name, e.g. `api.v1.APIService`
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `(key, descriptor)` pairs in declaration order
    pub fn methods(&self) -> impl Iterator<Item = (&'static str, &'static MethodDescriptor)> {
        let methods: &'static [(&'static str, MethodDescriptor)] = self.methods;
        methods.iter().map(|(key, method)| (*key, method))
    }

    /// Look up a method by its key, e.g. `ping`
    pub fn method(&self, key: &str) -> Option<&'static MethodDescriptor> {
        self.methods().find(|(k, _)| *k == key).map(|(_, method)| method)
    }

    /// Look up a method by its wire name, e.g. `Ping`
    pub fn method_by_name(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.methods()
            .find(|(_, method)| method.name == name)
            .map(|(_, method)| method)
    }

    pub fn route(&self, method: &MethodDescriptor) -> Route {
        Route {
            service: self.type_name,
            method: method.name,
        }
    }

    /// Routes of every method, in declaration order
    pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
        self.methods().map(move |(_, method)| self.route(method))
    }

    /// Map a gRPC request path back to the method it addresses
    pub fn resolve_path(&self, path: &str) -> Option<&'static MethodDescriptor> {
        let rest = path.strip_prefix('/')?;
        let (service, method) = rest.split_once('/')?;
        if service != self.type_name {
            return None;
        }
        self.method_by_name(method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Left {
        #[prost(string, tag = "1")]
        value: String,
    }

    impl prost::Name for Left {
        const NAME: &'static str = "Left";
        const PACKAGE: &'static str = "test.v1";
    }

    #[derive(Clone, PartialEq, prost::Message)]
    struct Right {
        #[prost(uint64, tag = "1")]
        value: u64,
    }

    impl prost::Name for Right {
        const NAME: &'static str = "Right";
        const PACKAGE: &'static str = "test.v1";
    }

    static TEST_SERVICE: ServiceDescriptor = ServiceDescriptor::new(
        "test.v1.TestService",
        &[
            (
                "swap",
                MethodDescriptor::new(
                    "Swap",
                    MessageType::of::<Left>(),
                    MessageType::of::<Right>(),
                    MethodKind::Unary,
                ),
            ),
            (
                "watch",
                MethodDescriptor::new(
                    "Watch",
                    MessageType::of::<Left>(),
                    MessageType::of::<Left>(),
                    MethodKind::ServerStreaming,
                ),
            ),
        ],
    );

    #[test]
    fn test_methods_keep_declaration_order() {
        let keys: Vec<_> = TEST_SERVICE.methods().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["swap", "watch"]);
        assert_eq!(TEST_SERVICE.len(), 2);
        assert!(!TEST_SERVICE.is_empty());
    }

    #[test]
    fn test_message_type_identity() {
        let left = MessageType::of::<Left>();
        assert!(left.is::<Left>());
        assert!(!left.is::<Right>());
        assert_eq!(left.full_name(), "test.v1.Left");
        assert_ne!(left, MessageType::of::<Right>());
    }

    #[test]
    fn test_lookup_by_key_and_name() {
        let swap = TEST_SERVICE.method("swap").unwrap();
        assert_eq!(swap.name(), "Swap");
        assert_eq!(TEST_SERVICE.method_by_name("Watch").unwrap().kind(), MethodKind::ServerStreaming);
        assert!(TEST_SERVICE.method("Swap").is_none());
        assert!(TEST_SERVICE.method_by_name("swap").is_none());
    }

    #[test]
    fn test_resolve_path() {
        let route = TEST_SERVICE.route(TEST_SERVICE.method("swap").unwrap());
        assert_eq!(route.path(), "/test.v1.TestService/Swap");
        assert_eq!(route.to_string(), route.path());

        let resolved = TEST_SERVICE.resolve_path("/test.v1.TestService/Swap").unwrap();
        assert_eq!(resolved.input(), MessageType::of::<Left>());
        assert!(TEST_SERVICE.resolve_path("/other.Service/Swap").is_none());
        assert!(TEST_SERVICE.resolve_path("test.v1.TestService/Swap").is_none());
        assert!(TEST_SERVICE.resolve_path("/test.v1.TestService").is_none());
    }

    #[test]
    fn test_empty_service() {
        let empty = ServiceDescriptor::new("test.v1.Empty", &[]);
        assert!(empty.is_empty());
        assert_eq!(empty.routes().count(), 0);
    }
}
