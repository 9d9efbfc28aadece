//! Tabular result output
//!
//! Raw outcomes and aggregate rows are written as two CSV tables, named
//! `<prefix>_raw.csv` and `<prefix>_averages.csv`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    aggregate::{AggregateBy, AggregateRow},
    outcome::Outcome,
};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Consumer of a run's raw outcomes and aggregate rows
pub trait ResultSink {
    fn write(
        &mut self,
        outcomes: &[Outcome],
        rows: &[AggregateRow],
        by: AggregateBy,
    ) -> Result<(), SinkError>;
}

pub struct CsvSink {
    dir: PathBuf,
    prefix: String,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.dir.join(format!("{}_raw.csv", self.prefix))
    }

    pub fn averages_path(&self) -> PathBuf {
        self.dir.join(format!("{}_averages.csv", self.prefix))
    }

    fn write_raw(&self, path: &Path, outcomes: &[Outcome]) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "Trial",
            "Index",
            "Number",
            "IsPrime",
            "ResponseTime",
            "Server",
        ])?;
        for outcome in outcomes {
            let latency = outcome
                .latency
                .map(|l| format!("{:.6}", l.as_secs_f64()))
                .unwrap_or_else(|| "N/A".to_string());
            writer.write_record([
                outcome.trial.to_string(),
                outcome.index.to_string(),
                outcome.value.to_string(),
                outcome.classification.label().to_string(),
                latency,
                outcome.endpoint.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_averages(
        &self,
        path: &Path,
        rows: &[AggregateRow],
        by: AggregateBy,
    ) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        match by {
            AggregateBy::TrialAndEndpoint => {
                writer.write_record(["Trial", "Server", "ResponseTime", "Samples"])?
            }
            AggregateBy::Trial => writer.write_record(["Trial", "ResponseTime", "Samples"])?,
        }
        for row in rows {
            let mut record = vec![row.trial.to_string()];
            if by == AggregateBy::TrialAndEndpoint {
                record.push(
                    row.endpoint
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                );
            }
            record.push(format!("{:.6}", row.mean_latency.as_secs_f64()));
            record.push(row.samples.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ResultSink for CsvSink {
    fn write(
        &mut self,
        outcomes: &[Outcome],
        rows: &[AggregateRow],
        by: AggregateBy,
    ) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let raw = self.raw_path();
        self.write_raw(&raw, outcomes)
            .map_err(|source| SinkError::Csv {
                path: raw.clone(),
                source,
            })?;

        let averages = self.averages_path();
        self.write_averages(&averages, rows, by)
            .map_err(|source| SinkError::Csv {
                path: averages.clone(),
                source,
            })?;

        info!(
            "Wrote {} outcomes to {} and {} averages to {}",
            outcomes.len(),
            raw.display(),
            rows.len(),
            averages.display()
        );
        Ok(())
    }
}
