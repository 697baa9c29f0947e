//! Load workload against the users API.
//!
//! A run spawns a fixed number of virtual users. Each one repeatedly creates a
//! user, lists users and pauses, until the run duration is over. Every request
//! and check is recorded; thresholds over the aggregated metrics decide
//! whether the run as a whole passed.

pub mod config;
pub mod metrics;
pub mod runner;
pub mod stats;
pub mod summary;
pub mod threshold;
pub mod workload;

pub use config::{ConfigError, LoadConfig, WorkloadConfig};
pub use runner::run_workload;
pub use stats::RunMetrics;
pub use summary::RunSummary;
pub use threshold::{Threshold, ThresholdError};
