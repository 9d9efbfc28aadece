use super::{ConfigResult, ConfigValidator, RunConfig};
use crate::{aggregate::AggregateBy, endpoint::Endpoint, workload::WorkloadPolicy};

/// Builder for RunConfig that wraps the config itself
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing configuration (takes ownership)
    pub fn from_config(config: RunConfig) -> Self {
        Self { config }
    }

    // ==================== Run Shape ====================

    pub fn trials(mut self, trials: u32) -> Self {
        self.config.trials = trials;
        self
    }

    pub fn numbers_per_trial(mut self, count: usize) -> Self {
        self.config.numbers_per_trial = count;
        self
    }

    pub fn endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    pub fn add_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoints.push(endpoint);
        self
    }

    pub fn workload(mut self, workload: WorkloadPolicy) -> Self {
        self.config.workload = workload;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn aggregate_by(mut self, by: AggregateBy) -> Self {
        self.config.aggregate_by = by;
        self
    }

    // ==================== Transport ====================

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    // ==================== Output & Logging ====================

    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = Some(prefix.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = Some(level.into());
        self
    }

    pub fn log_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.log_dir = Some(dir.into());
        self
    }

    pub fn json_logs(mut self, enable: bool) -> Self {
        self.config.json_logs = enable;
        self
    }

    /// Build and validate
    pub fn build(self) -> ConfigResult<RunConfig> {
        ConfigValidator::validate(&self.config)?;
        Ok(self.config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> RunConfig {
        self.config
    }
}
