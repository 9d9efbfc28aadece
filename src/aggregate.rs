//! Per-trial / per-endpoint latency aggregation
//!
//! Only successful calls contribute to the mean. A group without any
//! successful call yields no row rather than a zero.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    endpoint::Endpoint,
    outcome::{Classification, Outcome},
};

/// Grouping key for aggregate rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateBy {
    #[default]
    TrialAndEndpoint,
    Trial,
}

impl std::str::FromStr for AggregateBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial_and_endpoint" | "trial-and-endpoint" | "server" => Ok(Self::TrialAndEndpoint),
            "trial" => Ok(Self::Trial),
            other => Err(format!("unknown aggregation '{}'", other)),
        }
    }
}

/// Mean latency of the successful calls in one group
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub trial: u32,
    /// `None` when aggregating per trial only
    pub endpoint: Option<Endpoint>,
    pub mean_latency: Duration,
    pub samples: usize,
}

/// Counts across every recorded outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub successes: usize,
    pub errors: usize,
    pub unavailable: usize,
    pub mean_latency: Option<Duration>,
}

#[derive(Default)]
struct Accumulator {
    sum: Duration,
    samples: usize,
}

impl Accumulator {
    fn add(&mut self, latency: Duration) {
        self.sum += latency;
        self.samples += 1;
    }

    fn mean(&self) -> Option<Duration> {
        if self.samples == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.sum.as_secs_f64() / self.samples as f64,
        ))
    }
}

/// Collects outcomes across all trials of a run
#[derive(Debug, Default)]
pub struct Aggregator {
    outcomes: Vec<Outcome>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }

    /// Aggregate rows ordered by trial, then endpoint
    pub fn rows(&self, by: AggregateBy) -> Vec<AggregateRow> {
        let mut groups: BTreeMap<(u32, Option<&Endpoint>), Accumulator> = BTreeMap::new();

        for outcome in &self.outcomes {
            let endpoint = match by {
                AggregateBy::TrialAndEndpoint => Some(&outcome.endpoint),
                AggregateBy::Trial => None,
            };
            let acc = groups.entry((outcome.trial, endpoint)).or_default();
            if let Some(latency) = outcome.success_latency() {
                acc.add(latency);
            }
        }

        groups
            .into_iter()
            .filter_map(|((trial, endpoint), acc)| {
                acc.mean().map(|mean_latency| AggregateRow {
                    trial,
                    endpoint: endpoint.cloned(),
                    mean_latency,
                    samples: acc.samples,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut overall = Accumulator::default();
        let mut summary = RunSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };

        for outcome in &self.outcomes {
            match outcome.classification {
                Classification::True | Classification::False => summary.successes += 1,
                Classification::Error => summary.errors += 1,
                Classification::Unavailable => summary.unavailable += 1,
            }
            if let Some(latency) = outcome.success_latency() {
                overall.add(latency);
            }
        }
        summary.mean_latency = overall.mean();
        summary
    }
}
