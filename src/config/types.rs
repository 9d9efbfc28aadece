use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::{aggregate::AggregateBy, endpoint::Endpoint, workload::WorkloadPolicy};

/// Complete configuration of one load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of sequential trials
    pub trials: u32,
    /// Workload items dispatched per trial
    pub numbers_per_trial: usize,
    /// Classification servers, assigned round-robin by item position
    pub endpoints: Vec<Endpoint>,
    /// Input generation policy
    pub workload: WorkloadPolicy,
    /// Maximum calls in flight at once
    pub max_concurrency: usize,
    /// Grouping used for the averages table
    pub aggregate_by: AggregateBy,
    /// Per-call connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-call request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Directory for result tables
    pub output_dir: String,
    /// File name prefix for result tables (None = derived from run size)
    pub output_prefix: Option<String>,
    /// Log level (None = info)
    pub log_level: Option<String>,
    /// Log directory (None = stdout only)
    pub log_dir: Option<String>,
    /// Emit logs as JSON
    pub json_logs: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            numbers_per_trial: 100,
            endpoints: Vec::new(),
            workload: WorkloadPolicy::default(),
            max_concurrency: 100,
            aggregate_by: AggregateBy::default(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            output_dir: ".".to_string(),
            output_prefix: None,
            log_level: None,
            log_dir: None,
            json_logs: false,
        }
    }
}

impl RunConfig {
    pub fn builder() -> super::RunConfigBuilder {
        super::RunConfigBuilder::new()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Output prefix, defaulting to `prime_checks_trials_{trials}_numbers_{n}`
    pub fn effective_output_prefix(&self) -> String {
        self.output_prefix.clone().unwrap_or_else(|| {
            format!(
                "prime_checks_trials_{}_numbers_{}",
                self.trials, self.numbers_per_trial
            )
        })
    }
}
