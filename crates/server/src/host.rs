//! gRPC host for `api.v1.APIService`
//!
//! Serves the service next to the standard health and reflection services
//! and stops accepting requests once the shutdown future resolves.

use apiservice_common::{ApiError, Result};
use apiservice_proto::api::v1::api_service_server::{ApiService, ApiServiceServer};
use apiservice_proto::{Route, API_SERVICE, FILE_DESCRIPTOR_SET};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::server::NamedService;
use tonic::transport::Server;
use tracing::{debug, error, info};

/// gRPC server hosting one `ApiService` implementation
pub struct ServiceHost<H> {
    handler: H,
}

impl<H: ApiService> ServiceHost<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Routes answered by the hosted service, in declaration order
    pub fn routes(&self) -> Vec<Route> {
        API_SERVICE.routes().collect()
    }

    /// Log the route table
    pub fn log_routes(&self) {
        info!("Available routes");
        for route in self.routes() {
            debug!(route = %route, "Route");
        }
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<ApiServiceServer<H>>()
            .await;

        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|e| ApiError::internal(format!("reflection service: {}", e)))?;

        info!(
            "gRPC service {} listening on {}",
            <ApiServiceServer<H> as NamedService>::NAME,
            listener.local_addr()?
        );

        let incoming = TcpListenerStream::new(listener);
        Server::builder()
            .trace_fn(|request| {
                let path = request.uri().path();
                tracing::info_span!("grpc", method = method_label(path), path = %path)
            })
            .add_service(health_service)
            .add_service(reflection_service)
            .add_service(ApiServiceServer::new(self.handler))
            .serve_with_incoming_shutdown(incoming, shutdown)
            .await?;

        info!("gRPC server shutdown complete");
        Ok(())
    }
}

/// Method name of an `api.v1.APIService` request path, `unknown` otherwise
pub fn method_label(path: &str) -> &'static str {
    API_SERVICE.resolve_path(path).map_or("unknown", |method| method.name())
}

/// Bind the server socket
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to create listener on {}: {}", addr, e);
        e.into()
    })
}

/// Resolve on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PingHandler;

    #[test]
    fn test_routes_follow_descriptor() {
        let host = ServiceHost::new(PingHandler::default());
        let paths: Vec<_> = host.routes().iter().map(Route::path).collect();
        assert_eq!(paths, vec!["/api.v1.APIService/Ping".to_string()]);
    }

    #[test]
    fn test_method_label() {
        assert_eq!(method_label("/api.v1.APIService/Ping"), "Ping");
        assert_eq!(method_label("/api.v1.APIService/Echo"), "unknown");
        assert_eq!(method_label("/grpc.health.v1.Health/Check"), "unknown");
        assert_eq!(method_label("/"), "unknown");
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
