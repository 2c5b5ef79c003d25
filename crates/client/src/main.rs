//! APIService Ping Client - Main Entry Point
//!
//! Sends a single `Ping` to the configured endpoint and prints the response
//! as JSON. The message is taken from the command-line arguments.

use apiservice_client::{ApiClient, GrpcTransport};
use apiservice_common::{logging, Result, ServiceConfig};
use apiservice_proto::PingRequest;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("APISERVICE_CONFIG").ok().map(PathBuf::from);
    let config = ServiceConfig::load(config_path.as_deref())?;

    logging::init(&config.log_level);

    let message = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let transport = GrpcTransport::connect(config.endpoint.clone()).await?;
    let client = ApiClient::new(transport).with_timeout(config.request_timeout());

    info!("Pinging {}", config.endpoint);
    let response = client.ping(PingRequest { message }).await?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
