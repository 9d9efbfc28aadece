//! Remote call client
//!
//! [`ClassifyClient`] is the seam between the dispatcher and the transport.
//! [`timed_classify`] wraps one call with latency measurement and turns every
//! failure into [`Classification::Error`], so callers never see a fault.

pub mod grpc;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::warn;

use crate::{endpoint::Endpoint, outcome::Classification};

pub use grpc::{proto, GrpcClassifyClient};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid endpoint URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("RPC to {endpoint} failed with {code:?}: {message}")]
    Rpc {
        endpoint: String,
        code: tonic::Code,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// One synchronous classification call against a server
#[async_trait]
pub trait ClassifyClient: Send + Sync {
    /// Ask `endpoint` whether `value` is prime
    async fn classify(&self, endpoint: &Endpoint, value: i64) -> Result<bool, ClientError>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}

/// Classification and latency of a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallResult {
    pub classification: Classification,
    pub latency: Duration,
}

/// Perform one call and measure its wall-clock latency.
///
/// Latency runs from just before the call starts until it returns or fails;
/// failed calls keep their latency so slow failures remain visible.
pub async fn timed_classify<C>(client: &C, endpoint: &Endpoint, value: i64) -> CallResult
where
    C: ClassifyClient + ?Sized,
{
    let start = Instant::now();
    let result = client.classify(endpoint, value).await;
    let latency = start.elapsed();

    let classification = match result {
        Ok(is_prime) => Classification::from_bool(is_prime),
        Err(e) => {
            warn!(
                "Communication error with server {} for number {}: {}",
                endpoint, value, e
            );
            Classification::Error
        }
    };

    CallResult {
        classification,
        latency,
    }
}
