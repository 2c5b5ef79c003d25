//! `api.v1.APIService` implementation

use apiservice_common::metrics::RpcMetrics;
use apiservice_common::{ApiError, METRICS, REQUEST_ID_HEADER};
use apiservice_proto::api::v1::api_service_server::ApiService;
use apiservice_proto::api::v1::PING;
use apiservice_proto::{PingRequest, PingResponse, API_SERVICE};
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

/// Default cap on the `Ping` message, in bytes
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4096;

/// Answers `Ping` with `Pong: <message>`
#[derive(Debug, Clone)]
pub struct PingHandler {
    metrics: RpcMetrics,
    method: &'static str,
    max_message_bytes: usize,
}

impl PingHandler {
    pub fn new(metrics: RpcMetrics) -> Self {
        Self {
            metrics,
            method: API_SERVICE.method(PING).map_or("unknown", |m| m.name()),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Reject messages longer than `max` bytes with `INVALID_ARGUMENT`
    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }
}

impl Default for PingHandler {
    fn default() -> Self {
        Self::new(METRICS.rpc.clone())
    }
}

#[tonic::async_trait]
impl ApiService for PingHandler {
    async fn ping(
        &self,
        request: Request<PingRequest>,
    ) -> Result<Response<PingResponse>, Status> {
        let mut timer = self.metrics.start(self.method);

        let request_id = request
            .metadata()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let message = request.into_inner().message;

        if message.len() > self.max_message_bytes {
            warn!(
                request_id = %request_id,
                size = message.len(),
                "Rejecting oversized {} message",
                self.method
            );
            timer.fail();
            return Err(ApiError::invalid_input(format!(
                "message is {} bytes, limit is {}",
                message.len(),
                self.max_message_bytes
            ))
            .into());
        }

        debug!(request_id = %request_id, message = %message, "Handling {}", self.method);

        Ok(Response::new(PingResponse {
            message: format!("Pong: {}", message),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiservice_common::MetricsRegistry;

    #[tokio::test]
    async fn test_ping_prefixes_pong() {
        let registry = MetricsRegistry::new().unwrap();
        let handler = PingHandler::new(registry.rpc.clone());

        let response = handler
            .ping(Request::new(PingRequest {
                message: "hello".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(response.into_inner().message, "Pong: hello");

        let empty = handler.ping(Request::new(PingRequest::default())).await.unwrap();
        assert_eq!(empty.into_inner().message, "Pong: ");

        assert_eq!(registry.rpc.requests_total.with_label_values(&["Ping"]).get(), 2);
        assert_eq!(registry.rpc.failures_total.with_label_values(&["Ping"]).get(), 0);
        assert_eq!(registry.rpc.active_requests.get(), 0);
    }

    #[tokio::test]
    async fn test_oversized_message_is_rejected() {
        let registry = MetricsRegistry::new().unwrap();
        let handler = PingHandler::new(registry.rpc.clone()).with_max_message_bytes(4);

        let at_limit = handler
            .ping(Request::new(PingRequest {
                message: "four".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(at_limit.into_inner().message, "Pong: four");

        let status = handler
            .ping(Request::new(PingRequest {
                message: "fives".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("limit is 4"));

        assert_eq!(registry.rpc.requests_total.with_label_values(&["Ping"]).get(), 2);
        assert_eq!(registry.rpc.failures_total.with_label_values(&["Ping"]).get(), 1);
        assert_eq!(registry.rpc.active_requests.get(), 0);
    }
}
