use anyhow::Context;
use clap::Parser;
use prime_bench::{
    aggregate::AggregateBy,
    config::{RunConfig, RunConfigBuilder},
    endpoint::{Endpoint, DEFAULT_PORT},
    logging::{self, LoggingConfig},
    runner::Runner,
    sink::CsvSink,
    workload::WorkloadPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "prime-bench")]
#[command(about = "Concurrent load harness for gRPC prime classification servers")]
#[command(long_about = r#"
Concurrent load harness for gRPC prime classification servers

Runs a number of sequential trials. Each trial generates a workload of numbers,
assigns them round-robin to the given servers and dispatches them concurrently.
Raw results and mean response times are written as CSV tables.

Examples:
  # 10 trials of 100 fixed numbers against two servers
  prime-bench 10 100 192.168.100.2,192.168.100.3

  # Seeded random workload, per-trial averages only
  prime-bench 5 50 10.0.0.1:9000 --workload seeded --seed 7 --aggregate-by trial

  # Everything from a JSON file, overriding concurrency
  prime-bench --config run.json --max-concurrency 10
"#)]
struct CliArgs {
    /// Number of trials to run
    trials: Option<u32>,

    /// Number of numbers to check per trial
    numbers_per_trial: Option<usize>,

    /// Comma-separated list of server addresses (host or host:port)
    servers: Option<String>,

    /// JSON run configuration; command line values override it
    #[arg(long)]
    config: Option<String>,

    /// Port used for servers given without one
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Workload preset
    #[arg(long, value_parser = ["random", "seeded", "fixed", "alternating", "heavy-light"])]
    workload: Option<String>,

    /// Seed for random workloads
    #[arg(long)]
    seed: Option<u64>,

    /// Offset the seed by the trial number instead of replaying it
    #[arg(long, default_value_t = false)]
    reseed_per_trial: bool,

    /// Lower bound for random workloads (heavy bound for heavy-light)
    #[arg(long, allow_negative_numbers = true)]
    low: Option<i64>,

    /// Upper bound for random workloads (heavy bound for heavy-light)
    #[arg(long, allow_negative_numbers = true)]
    high: Option<i64>,

    /// Value for the fixed workload, or the even-position value for alternating
    #[arg(long, allow_negative_numbers = true)]
    value: Option<i64>,

    /// Odd-position value for the alternating workload
    #[arg(long, allow_negative_numbers = true)]
    second_value: Option<i64>,

    /// Maximum number of calls in flight
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Grouping for the averages table
    #[arg(long, value_parser = ["trial_and_endpoint", "trial"])]
    aggregate_by: Option<String>,

    /// Per-call connect timeout in milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Per-call request timeout in milliseconds
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Directory for the CSV tables
    #[arg(long)]
    output_dir: Option<String>,

    /// File name prefix for the CSV tables
    #[arg(long)]
    output_prefix: Option<String>,

    /// Set the logging level
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// Directory to store log files
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

impl CliArgs {
    fn workload(&self, base: &WorkloadPolicy) -> Option<WorkloadPolicy> {
        let policy = match self.workload.as_deref() {
            Some("random") => WorkloadPolicy::random_large(),
            Some("seeded") => WorkloadPolicy::seeded(self.seed.unwrap_or(42)),
            Some("alternating") => WorkloadPolicy::alternating_prime(),
            Some("heavy-light") => WorkloadPolicy::heavy_light(),
            Some(_) => WorkloadPolicy::fixed_prime(),
            None if self.has_workload_overrides() => base.clone(),
            None => return None,
        };
        Some(self.apply_overrides(policy))
    }

    fn has_workload_overrides(&self) -> bool {
        self.seed.is_some()
            || self.reseed_per_trial
            || self.low.is_some()
            || self.high.is_some()
            || self.value.is_some()
            || self.second_value.is_some()
    }

    fn apply_overrides(&self, policy: WorkloadPolicy) -> WorkloadPolicy {
        match policy {
            WorkloadPolicy::Uniform {
                low,
                high,
                seed,
                reseed_per_trial,
            } => WorkloadPolicy::Uniform {
                low: self.low.unwrap_or(low),
                high: self.high.unwrap_or(high),
                seed: self.seed.or(seed),
                reseed_per_trial: reseed_per_trial || self.reseed_per_trial,
            },
            WorkloadPolicy::Fixed { value } => WorkloadPolicy::Fixed {
                value: self.value.unwrap_or(value),
            },
            WorkloadPolicy::Alternating { first, second } => WorkloadPolicy::Alternating {
                first: self.value.unwrap_or(first),
                second: self.second_value.unwrap_or(second),
            },
            WorkloadPolicy::HeavyLight {
                heavy_low,
                heavy_high,
                light_low,
                light_high,
                seed,
                reseed_per_trial,
            } => WorkloadPolicy::HeavyLight {
                heavy_low: self.low.unwrap_or(heavy_low),
                heavy_high: self.high.unwrap_or(heavy_high),
                light_low,
                light_high,
                seed: self.seed.or(seed),
                reseed_per_trial: reseed_per_trial || self.reseed_per_trial,
            },
        }
    }

    fn to_run_config(&self) -> anyhow::Result<RunConfig> {
        let base = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };

        let mut builder = RunConfigBuilder::from_config(base.clone());

        if let Some(trials) = self.trials {
            builder = builder.trials(trials);
        }
        if let Some(count) = self.numbers_per_trial {
            builder = builder.numbers_per_trial(count);
        }
        if let Some(servers) = &self.servers {
            let endpoints = Endpoint::parse_list(servers, self.port)
                .with_context(|| format!("invalid server list '{}'", servers))?;
            builder = builder.endpoints(endpoints);
        }
        if let Some(workload) = self.workload(&base.workload) {
            builder = builder.workload(workload);
        }
        if let Some(max) = self.max_concurrency {
            builder = builder.max_concurrency(max);
        }
        if let Some(by) = &self.aggregate_by {
            let by: AggregateBy = by.parse().map_err(anyhow::Error::msg)?;
            builder = builder.aggregate_by(by);
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.connect_timeout_ms(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            builder = builder.request_timeout_ms(ms);
        }
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(dir.clone());
        }
        if let Some(prefix) = &self.output_prefix {
            builder = builder.output_prefix(prefix.clone());
        }
        if let Some(level) = &self.log_level {
            builder = builder.log_level(level.clone());
        }
        if let Some(dir) = &self.log_dir {
            builder = builder.log_dir(dir.clone());
        }
        if self.json_logs {
            builder = builder.json_logs(true);
        }

        Ok(builder.build()?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.to_run_config()?;

    let _log_guard = logging::init_logging(LoggingConfig::from_run_config(&config));

    let runner = Runner::grpc(config)?;
    let report = runner.run().await?;

    let config = runner.config();
    let mut sink = CsvSink::new(&config.output_dir, config.effective_output_prefix());
    report.write_to(&mut sink)?;

    Ok(())
}
