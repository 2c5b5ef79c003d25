//! Common error types for APIService
//!
//! All errors are convertible to gRPC status codes for proper error propagation.

use std::net::AddrParseError;
use thiserror::Error;

/// Main error type for APIService
#[derive(Error, Debug)]
pub enum ApiError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// gRPC communication errors
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// gRPC transport errors
    #[error("gRPC transport error: {0}")]
    GrpcTransport(#[from] tonic::transport::Error),

    /// Method key not present in the service descriptor
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Call kind the runtime cannot drive
    #[error("Method {method} is {kind}, expected unary")]
    UnsupportedCallKind { method: String, kind: String },

    /// Message type does not match the descriptor
    #[error("Method {method} expects {expected}, got {actual}")]
    TypeMismatch {
        method: String,
        expected: String,
        actual: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics registration errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AddrParseError> for ApiError {
    fn from(err: AddrParseError) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl ApiError {
    /// Convert error to gRPC status code
    pub fn to_status(&self) -> tonic::Status {
        match self {
            ApiError::Grpc(status) => status.clone(),
            ApiError::GrpcTransport(_) => tonic::Status::unavailable("Transport error"),
            ApiError::Config(msg) => {
                tonic::Status::internal(format!("Configuration error: {}", msg))
            }
            ApiError::UnknownMethod(method) => {
                tonic::Status::unimplemented(format!("Unknown method: {}", method))
            }
            ApiError::UnsupportedCallKind { method, kind } => tonic::Status::unimplemented(
                format!("Method {} is {}, expected unary", method, kind),
            ),
            ApiError::TypeMismatch {
                method,
                expected,
                actual,
            } => tonic::Status::invalid_argument(format!(
                "Method {} expects {}, got {}",
                method, expected, actual
            )),
            ApiError::InvalidInput(msg) => {
                tonic::Status::invalid_argument(format!("Invalid input: {}", msg))
            }
            ApiError::Timeout(msg) => {
                tonic::Status::deadline_exceeded(format!("Timeout: {}", msg))
            }
            ApiError::Parse(msg) => {
                tonic::Status::invalid_argument(format!("Parse error: {}", msg))
            }
            ApiError::Serialization(err) => {
                tonic::Status::internal(format!("Serialization error: {}", err))
            }
            ApiError::Io(err) => tonic::Status::internal(format!("I/O error: {}", err)),
            ApiError::Metrics(err) => tonic::Status::internal(format!("Metrics error: {}", err)),
            ApiError::Internal(msg) => {
                tonic::Status::internal(format!("Internal error: {}", msg))
            }
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ApiError::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ApiError::InvalidInput(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        ApiError::Timeout(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

impl From<ApiError> for tonic::Status {
    fn from(err: ApiError) -> Self {
        err.to_status()
    }
}

/// Result type alias for APIService operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_passthrough() {
        let err = ApiError::from(tonic::Status::not_found("missing"));
        let status = err.to_status();
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert_eq!(status.message(), "missing");
    }

    #[test]
    fn test_descriptor_errors_map_to_codes() {
        let unknown = ApiError::UnknownMethod("echo".to_string());
        assert_eq!(unknown.to_status().code(), tonic::Code::Unimplemented);

        let kind = ApiError::UnsupportedCallKind {
            method: "Watch".to_string(),
            kind: "server-streaming".to_string(),
        };
        assert_eq!(kind.to_string(), "Method Watch is server-streaming, expected unary");
        assert_eq!(kind.to_status().code(), tonic::Code::Unimplemented);

        let mismatch = ApiError::TypeMismatch {
            method: "Ping".to_string(),
            expected: "api.v1.PingRequest".to_string(),
            actual: "api.v1.PingResponse".to_string(),
        };
        assert_eq!(
            tonic::Status::from(mismatch).code(),
            tonic::Code::InvalidArgument
        );
    }

    #[test]
    fn test_serde_json_error_is_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(json_err);
        assert!(matches!(err, ApiError::Serialization(_)));
        assert_eq!(err.to_status().code(), tonic::Code::Internal);
    }

    #[test]
    fn test_invalid_input_is_invalid_argument() {
        let status = tonic::Status::from(ApiError::invalid_input("too long"));
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "Invalid input: too long");
    }

    #[test]
    fn test_addr_parse_error() {
        let err: ApiError = "not an address".parse::<std::net::SocketAddr>().unwrap_err().into();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
