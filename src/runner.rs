//! Sequential trial loop
//!
//! Trials run one after another; each trial's outcomes are dispatched
//! concurrently and then folded into the run-wide aggregator.

use std::{sync::Arc, time::Instant};

use tracing::{info, warn};

use crate::{
    aggregate::{AggregateBy, AggregateRow, Aggregator, RunSummary},
    client::{ClassifyClient, GrpcClassifyClient},
    config::{ConfigError, ConfigValidator, RunConfig},
    dispatcher::{DispatchError, Dispatcher},
    endpoint::{EndpointError, RoundRobinSelector},
    outcome::Outcome,
    sink::{ResultSink, SinkError},
};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<Outcome>,
    pub rows: Vec<AggregateRow>,
    pub summary: RunSummary,
    pub aggregate_by: AggregateBy,
}

impl RunReport {
    pub fn write_to(&self, sink: &mut dyn ResultSink) -> Result<(), SinkError> {
        sink.write(&self.outcomes, &self.rows, self.aggregate_by)
    }
}

pub struct Runner<C: ?Sized> {
    config: RunConfig,
    dispatcher: Dispatcher<C>,
}

impl Runner<GrpcClassifyClient> {
    /// Runner talking gRPC with the configured timeouts
    pub fn grpc(config: RunConfig) -> Result<Self, RunError> {
        let client = GrpcClassifyClient::new(config.connect_timeout(), config.request_timeout());
        Self::new(config, Arc::new(client))
    }
}

impl<C> Runner<C>
where
    C: ClassifyClient + ?Sized + 'static,
{
    /// Validate `config` and prepare the dispatcher; fails before anything is sent
    pub fn new(config: RunConfig, client: Arc<C>) -> Result<Self, RunError> {
        ConfigValidator::validate(&config)?;
        let selector = RoundRobinSelector::new(config.endpoints.clone())?;
        let dispatcher = Dispatcher::new(client, selector, config.max_concurrency)?;
        Ok(Self { config, dispatcher })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        let config = &self.config;
        info!(
            "Starting run: {} trials x {} numbers, workload={}, endpoints=[{}], max_concurrency={}",
            config.trials,
            config.numbers_per_trial,
            config.workload.name(),
            config
                .endpoints
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            config.max_concurrency
        );

        let mut aggregator = Aggregator::new();

        for trial in 1..=config.trials {
            let items = config.workload.items(config.numbers_per_trial, trial);
            let started = Instant::now();
            let outcomes = self.dispatcher.dispatch(trial, &items).await?;

            let failed = outcomes
                .iter()
                .filter(|o| !o.classification.is_success())
                .count();
            if failed > 0 {
                warn!(
                    "Trial {} finished with {} failed calls out of {}",
                    trial,
                    failed,
                    outcomes.len()
                );
            }
            info!(
                "Trial {}/{} completed: {} calls in {:.3}s",
                trial,
                config.trials,
                outcomes.len(),
                started.elapsed().as_secs_f64()
            );

            aggregator.extend(outcomes);
        }

        let rows = aggregator.rows(config.aggregate_by);
        let summary = aggregator.summary();
        for row in &rows {
            match &row.endpoint {
                Some(endpoint) => info!(
                    "Trial {} server {}: mean {:.4}s over {} calls",
                    row.trial,
                    endpoint,
                    row.mean_latency.as_secs_f64(),
                    row.samples
                ),
                None => info!(
                    "Trial {}: mean {:.4}s over {} calls",
                    row.trial,
                    row.mean_latency.as_secs_f64(),
                    row.samples
                ),
            }
        }
        info!(
            "Run finished: {} calls, {} ok, {} errors, {} unavailable, mean {}",
            summary.total,
            summary.successes,
            summary.errors,
            summary.unavailable,
            summary
                .mean_latency
                .map(|d| format!("{:.4}s", d.as_secs_f64()))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok(RunReport {
            outcomes: aggregator.into_outcomes(),
            rows,
            summary,
            aggregate_by: config.aggregate_by,
        })
    }
}
