//! APIService common library
//!
//! This crate contains shared code used by the server and the client.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use error::{ApiError, Result};
pub use metrics::{MetricsRegistry, METRICS};

/// Metadata key carrying the per-call request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";
