//! APIService Server - Main Entry Point
//!
//! Loads configuration, serves `api.v1.APIService` and shuts down gracefully
//! on SIGINT/SIGTERM.

use apiservice_common::{logging, ApiError, Result, ServiceConfig};
use apiservice_server::{bind, shutdown_signal, PingHandler, ServiceHost};
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::var("APISERVICE_CONFIG").ok().map(PathBuf::from);
    let config = ServiceConfig::load(config_path.as_deref())?;

    // Initialize logging with the configured level
    logging::init(&config.log_level);

    info!(
        "Server configuration loaded: bind={}:{}, log_level={}",
        config.bind_address, config.port, config.log_level
    );

    let handler = PingHandler::default().with_max_message_bytes(config.max_message_bytes);
    let host = ServiceHost::new(handler);
    host.log_routes();

    let listener = bind(config.socket_addr()?).await?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(host.serve(listener, async {
        let _ = shutdown_rx.await;
    }));

    // Wait for shutdown signal
    tokio::select! {
        _ = shutdown_signal() => {
            info!("Received shutdown signal");
        }
        result = &mut server => {
            error!("Server stopped unexpectedly");
            return result.map_err(|e| ApiError::internal(e.to_string()))?;
        }
    }

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(result) => result.map_err(|e| ApiError::internal(e.to_string()))??,
        Err(_) => {
            error!("Failed to shutdown server within {:?}", config.shutdown_timeout());
            return Err(ApiError::timeout("server shutdown"));
        }
    }

    info!("Server shutdown");
    Ok(())
}
