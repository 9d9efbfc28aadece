use std::time::Duration;

use async_trait::async_trait;
use tonic::{transport::Channel, Request};
use tracing::debug;

use super::{ClassifyClient, ClientError};
use crate::endpoint::Endpoint;

// Include the generated protobuf code
#[allow(clippy::all)]
pub mod proto {
    #![allow(clippy::all, unused_qualifications)]
    tonic::include_proto!("isprime");
}

/// gRPC client for the `IsPrimeFunc` service
///
/// Holds no connection: every call opens its own channel and drops it when the
/// call finishes, whichever way it finishes.
#[derive(Debug, Clone)]
pub struct GrpcClassifyClient {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl GrpcClassifyClient {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> Result<proto::is_prime_func_client::IsPrimeFuncClient<Channel>, ClientError> {
        let uri = endpoint.uri();
        debug!("Connecting to classification server at {}", uri);

        let channel = Channel::from_shared(uri.clone())
            .map_err(|e| ClientError::InvalidUri {
                uri,
                reason: e.to_string(),
            })?
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .tcp_nodelay(true)
            .connect()
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Ok(proto::is_prime_func_client::IsPrimeFuncClient::new(channel))
    }
}

impl Default for GrpcClassifyClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(60))
    }
}

#[async_trait]
impl ClassifyClient for GrpcClassifyClient {
    async fn classify(&self, endpoint: &Endpoint, value: i64) -> Result<bool, ClientError> {
        // channel lives only for this call
        let mut client = self.connect(endpoint).await?;
        let response = client
            .check_prime(Request::new(proto::Value { value }))
            .await
            .map_err(|status| ClientError::Rpc {
                endpoint: endpoint.to_string(),
                code: status.code(),
                message: status.message().to_string(),
            })?;
        Ok(response.into_inner().is_prime)
    }

    fn name(&self) -> &'static str {
        "grpc"
    }
}
