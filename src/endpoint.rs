//! Classification server addresses and round-robin assignment

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Port appended when an address is given without one
pub const DEFAULT_PORT: u16 = 9000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("Empty endpoint address")]
    Empty,

    #[error("Invalid port in endpoint '{address}': {reason}")]
    InvalidPort { address: String, reason: String },

    #[error("No endpoints configured")]
    NoEndpoints,
}

/// A classification server address (host + port)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host[:port]`, falling back to `default_port` when the port is omitted.
    ///
    /// `grpc://` and `http://` prefixes are accepted and stripped.
    pub fn parse_with_default(address: &str, default_port: u16) -> Result<Self, EndpointError> {
        let trimmed = address.trim();
        let stripped = trimmed
            .strip_prefix("grpc://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        if stripped.is_empty() {
            return Err(EndpointError::Empty);
        }

        match stripped.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(EndpointError::Empty);
                }
                let port = port
                    .parse::<u16>()
                    .map_err(|e| EndpointError::InvalidPort {
                        address: address.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(stripped, default_port)),
        }
    }

    /// Parse a comma-separated address list, e.g. `192.168.100.2,192.168.100.3:9001`
    pub fn parse_list(addresses: &str, default_port: u16) -> Result<Vec<Self>, EndpointError> {
        addresses
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self::parse_with_default(s, default_port))
            .collect()
    }

    /// URI understood by the tonic transport
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, DEFAULT_PORT)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

/// Round-robin endpoint assignment by workload position
///
/// Unlike a load-feedback balancer this keeps no counter: the endpoint for
/// position `i` is always `endpoints[i % len]`, so assignment is reproducible
/// for a given list.
#[derive(Debug, Clone)]
pub struct RoundRobinSelector {
    endpoints: Vec<Endpoint>,
}

impl RoundRobinSelector {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, EndpointError> {
        if endpoints.is_empty() {
            return Err(EndpointError::NoEndpoints);
        }
        Ok(Self { endpoints })
    }

    pub fn select(&self, index: usize) -> &Endpoint {
        &self.endpoints[index % self.endpoints.len()]
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
