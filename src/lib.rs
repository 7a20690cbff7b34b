#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

//! # iterbench
//!
//! Measures how loop style affects the cost of counting, filtering and
//! transforming a sequence of customer records.
//!
//! Each experiment group runs a handful of variants that compute the same
//! result with different iteration strategies. The driver sweeps dataset
//! sizes, times every variant on a freshly generated dataset and reports
//! timing, allocation and the ratio to the group's baseline.

pub mod config;
pub mod dataset;
pub mod error;
pub mod experiments;
pub mod metrics;
pub mod record;
pub mod report;
pub mod runner;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use experiments::{ExperimentGroup, Outcome, Variant};
pub use metrics::{MemoryMetrics, TimingStats};
pub use record::Customer;
pub use report::{ReportLogger, ReportRow, RowStatus, SweepReport};
pub use runner::BenchmarkRunner;
