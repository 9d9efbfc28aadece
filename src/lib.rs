pub mod aggregate;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod logging;
pub mod outcome;
pub mod runner;
pub mod sink;
pub mod workload;

pub use aggregate::{AggregateBy, AggregateRow, Aggregator};
pub use client::{ClassifyClient, ClientError, GrpcClassifyClient};
pub use config::{RunConfig, RunConfigBuilder};
pub use dispatcher::Dispatcher;
pub use endpoint::{Endpoint, RoundRobinSelector};
pub use outcome::{Classification, Outcome};
pub use runner::{RunError, RunReport, Runner};
pub use workload::{WorkloadItem, WorkloadPolicy};
