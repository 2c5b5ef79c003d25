//! Descriptor-driven unary call runtime
//!
//! `UnaryClient` resolves a method key against a [`ServiceDescriptor`],
//! checks the call kind and message types, and hands the request to a
//! [`Transport`]. No per-method call code is needed; [`ApiClient`] is a thin
//! typed facade over it for `api.v1.APIService`.

use crate::transport::Transport;
use apiservice_common::{ApiError, Result, REQUEST_ID_HEADER};
use apiservice_proto::api::v1::PING;
use apiservice_proto::{MethodDescriptor, MethodKind, PingRequest, PingResponse, ServiceDescriptor, API_SERVICE};
use std::time::Duration;
use tonic::metadata::AsciiMetadataValue;
use tonic::Request;
use tracing::debug;

/// Generic unary client for any service descriptor
#[derive(Debug, Clone)]
pub struct UnaryClient<T> {
    transport: T,
    service: &'static ServiceDescriptor,
    timeout: Option<Duration>,
}

impl<T: Transport> UnaryClient<T> {
    pub fn new(service: &'static ServiceDescriptor, transport: T) -> Self {
        Self {
            transport,
            service,
            timeout: None,
        }
    }

    /// Bound every call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn service(&self) -> &'static ServiceDescriptor {
        self.service
    }

    /// Resolve `key` to a unary method whose contract is `I -> O`
    pub fn resolve<I: prost::Name + 'static, O: prost::Name + 'static>(
        &self,
        key: &str,
    ) -> Result<&'static MethodDescriptor> {
        let method = self
            .service
            .method(key)
            .ok_or_else(|| ApiError::UnknownMethod(format!("{}.{}", self.service.type_name(), key)))?;

        if method.kind() != MethodKind::Unary {
            return Err(ApiError::UnsupportedCallKind {
                method: method.name().to_string(),
                kind: method.kind().to_string(),
            });
        }
        if !method.input().is::<I>() {
            return Err(ApiError::TypeMismatch {
                method: method.name().to_string(),
                expected: method.input().full_name(),
                actual: I::full_name(),
            });
        }
        if !method.output().is::<O>() {
            return Err(ApiError::TypeMismatch {
                method: method.name().to_string(),
                expected: method.output().full_name(),
                actual: O::full_name(),
            });
        }
        Ok(method)
    }

    /// Perform the unary call registered under `key`
    pub async fn call<I, O>(&self, key: &str, message: I) -> Result<O>
    where
        I: prost::Message + prost::Name + Send + Sync + 'static,
        O: prost::Message + prost::Name + Default + Send + Sync + 'static,
    {
        let method = self.resolve::<I, O>(key)?;
        let route = self.service.route(method);

        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = Request::new(message);
        let header = request_id
            .parse::<AsciiMetadataValue>()
            .map_err(|e| ApiError::internal(format!("Invalid request id: {}", e)))?;
        request.metadata_mut().insert(REQUEST_ID_HEADER, header);
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }

        debug!(route = %route, request_id = %request_id, "Sending unary request");
        let response = self.transport.unary(route, request).await?;
        Ok(response.into_inner())
    }
}

/// Typed client for `api.v1.APIService`
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    inner: UnaryClient<T>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: UnaryClient::new(&API_SERVICE, transport),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    pub async fn ping(&self, request: PingRequest) -> Result<PingResponse> {
        self.inner.call(PING, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiservice_proto::{MessageType, Route};
    use prost::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tonic::{Response, Status};

    /// Answers every call with a fixed `PingResponse` payload
    #[derive(Clone, Default)]
    struct EchoTransport {
        payload: PingResponse,
        calls: Arc<AtomicUsize>,
        seen: Arc<std::sync::Mutex<Vec<(Route, Option<String>)>>>,
    }

    #[tonic::async_trait]
    impl Transport for EchoTransport {
        async fn unary<I, O>(
            &self,
            route: Route,
            request: Request<I>,
        ) -> std::result::Result<Response<O>, Status>
        where
            I: prost::Message + Send + Sync + 'static,
            O: prost::Message + Default + Send + Sync + 'static,
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let request_id = request
                .metadata()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.seen.lock().unwrap().push((route, request_id));

            let body = O::decode(self.payload.encode_to_vec().as_slice())
                .map_err(|e| Status::internal(e.to_string()))?;
            Ok(Response::new(body))
        }
    }

    struct FailingTransport;

    #[tonic::async_trait]
    impl Transport for FailingTransport {
        async fn unary<I, O>(
            &self,
            _route: Route,
            _request: Request<I>,
        ) -> std::result::Result<Response<O>, Status>
        where
            I: prost::Message + Send + Sync + 'static,
            O: prost::Message + Default + Send + Sync + 'static,
        {
            Err(Status::unavailable("connection refused"))
        }
    }

    static STREAMING_SERVICE: ServiceDescriptor = ServiceDescriptor::new(
        "api.v1.StreamingService",
        &[(
            "watch",
            MethodDescriptor::new(
                "Watch",
                MessageType::of::<PingRequest>(),
                MessageType::of::<PingResponse>(),
                MethodKind::ServerStreaming,
            ),
        )],
    );

    #[tokio::test]
    async fn test_ping_returns_fixed_payload() {
        let transport = EchoTransport {
            payload: PingResponse {
                message: "fixed".to_string(),
            },
            ..Default::default()
        };
        let client = ApiClient::new(transport.clone());

        let response = client.ping(PingRequest::default()).await.unwrap();
        assert_eq!(
            response,
            PingResponse {
                message: "fixed".to_string()
            }
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let seen = transport.seen.lock().unwrap();
        let (route, request_id) = &seen[0];
        assert_eq!(route.path(), "/api.v1.APIService/Ping");
        assert!(request_id.as_deref().is_some_and(|id| uuid::Uuid::parse_str(id).is_ok()));
    }

    #[tokio::test]
    async fn test_unknown_method_skips_transport() {
        let transport = EchoTransport::default();
        let client = UnaryClient::new(&API_SERVICE, transport.clone());

        let err = client
            .call::<PingRequest, PingResponse>("echo", PingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownMethod(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mismatched_types_rejected() {
        let transport = EchoTransport::default();
        let client = UnaryClient::new(&API_SERVICE, transport.clone());

        let err = client
            .call::<PingResponse, PingResponse>(PING, PingResponse::default())
            .await
            .unwrap_err();
        match err {
            ApiError::TypeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, "api.v1.PingRequest");
                assert_eq!(actual, "api.v1.PingResponse");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = client
            .call::<PingRequest, PingRequest>(PING, PingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TypeMismatch { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_streaming_methods_rejected() {
        let transport = EchoTransport::default();
        let client = UnaryClient::new(&STREAMING_SERVICE, transport.clone());

        let err = client
            .call::<PingRequest, PingResponse>("watch", PingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedCallKind { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_status_propagates() {
        let client = ApiClient::new(FailingTransport);

        let err = client.ping(PingRequest::default()).await.unwrap_err();
        assert_eq!(err.to_status().code(), tonic::Code::Unavailable);
    }
}
