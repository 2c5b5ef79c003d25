//! APIService Client
//!
//! Generic unary RPC runtime driven by service descriptors, and the
//! transports it runs over.

pub mod runtime;
pub mod transport;

pub use runtime::{ApiClient, UnaryClient};
pub use transport::{GrpcTransport, Transport};
