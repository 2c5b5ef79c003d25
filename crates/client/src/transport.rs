//! Transports carrying unary calls to a remote service

use apiservice_common::Result;
use apiservice_proto::Route;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{GrpcMethod, Request, Response, Status};
use tracing::debug;

/// Carries a single typed request to a route and returns its typed response
///
/// The runtime has already checked the message types against the method
/// descriptor; a transport only moves bytes.
#[tonic::async_trait]
pub trait Transport: Send + Sync {
    async fn unary<I, O>(&self, route: Route, request: Request<I>) -> std::result::Result<Response<O>, Status>
    where
        I: prost::Message + Send + Sync + 'static,
        O: prost::Message + Default + Send + Sync + 'static;
}

/// gRPC transport over a tonic channel
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    inner: tonic::client::Grpc<Channel>,
}

impl GrpcTransport {
    /// Connect to an endpoint such as `http://127.0.0.1:8080`
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        debug!("Connecting to {}", endpoint);

        let channel = Endpoint::from_shared(endpoint)?.connect().await?;
        Ok(Self::new(channel))
    }

    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }
}

#[tonic::async_trait]
impl Transport for GrpcTransport {
    async fn unary<I, O>(&self, route: Route, request: Request<I>) -> std::result::Result<Response<O>, Status>
    where
        I: prost::Message + Send + Sync + 'static,
        O: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {}", e)))?;

        let path = PathAndQuery::try_from(route.path())
            .map_err(|e| Status::internal(format!("Invalid route {}: {}", route, e)))?;

        let mut request = request;
        request
            .extensions_mut()
            .insert(GrpcMethod::new(route.service, route.method));

        let codec = tonic::codec::ProstCodec::<I, O>::default();
        grpc.unary(request, path, codec).await
    }
}
