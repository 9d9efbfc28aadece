use super::*;

/// Configuration validator
///
/// Everything that would make a run fatal is rejected here, before any
/// request is dispatched.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &RunConfig) -> ConfigResult<()> {
        Self::validate_shape(config)?;
        Self::validate_endpoints(config)?;
        Self::validate_workload(config)?;
        Self::validate_transport(config)?;
        Self::validate_logging(config)?;
        Ok(())
    }

    fn validate_shape(config: &RunConfig) -> ConfigResult<()> {
        if config.trials == 0 {
            return Err(ConfigError::InvalidValue {
                field: "trials".to_string(),
                value: config.trials.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if config.numbers_per_trial == 0 {
            return Err(ConfigError::InvalidValue {
                field: "numbers_per_trial".to_string(),
                value: config.numbers_per_trial.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if config.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrency".to_string(),
                value: config.max_concurrency.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_endpoints(config: &RunConfig) -> ConfigResult<()> {
        if config.endpoints.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "endpoints".to_string(),
            });
        }

        for (idx, endpoint) in config.endpoints.iter().enumerate() {
            if endpoint.host.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("endpoints[{}]", idx),
                    value: endpoint.to_string(),
                    reason: "Host must not be empty".to_string(),
                });
            }
            if endpoint.port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("endpoints[{}]", idx),
                    value: endpoint.to_string(),
                    reason: "Port must be non-zero".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_workload(config: &RunConfig) -> ConfigResult<()> {
        config
            .workload
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "workload".to_string(),
                value: config.workload.name().to_string(),
                reason,
            })
    }

    fn validate_transport(config: &RunConfig) -> ConfigResult<()> {
        if config.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        if config.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_logging(config: &RunConfig) -> ConfigResult<()> {
        if let Some(level) = &config.log_level {
            if !matches!(
                level.as_str(),
                "trace" | "debug" | "info" | "warn" | "error"
            ) {
                return Err(ConfigError::InvalidValue {
                    field: "log_level".to_string(),
                    value: level.clone(),
                    reason: "Must be one of trace, debug, info, warn, error".to_string(),
                });
            }
        }
        Ok(())
    }
}
