//! Configuration for the APIService server and client
//!
//! Values come from built-in defaults, an optional YAML file and environment
//! variables, in that order of precedence.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Log levels accepted by `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server binding address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Time allowed for in-flight requests to drain on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Endpoint the client connects to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Client request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest `Ping` message the server accepts, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_message_bytes() -> usize {
    4096
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ApiError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: ServiceConfig = serde_yaml::from_str(&content).map_err(|e| {
            ApiError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional YAML file overlaid with the
    /// environment (`PORT`, `LOG_LEVEL`, `BIND_ADDRESS`, ...)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: ServiceConfig = builder
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ApiError::config("Port must be non-zero"));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ApiError::config(format!(
                "Invalid log level: {} (expected one of: {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(ApiError::config("Shutdown timeout must be non-zero"));
        }
        if self.max_message_bytes == 0 {
            return Err(ApiError::config("Max message size must be non-zero"));
        }
        if self.endpoint.is_empty() {
            return Err(ApiError::config("Endpoint must not be empty"));
        }
        Ok(())
    }

    /// Address the server listens on
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_address, self.port).parse::<SocketAddr>()?)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
