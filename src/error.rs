#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Error types for the iteration benchmark harness

use thiserror::Error;

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while generating datasets or running a sweep
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BenchError {
    /// A dataset size is non-positive or too large
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration cannot drive a sweep at all
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("failed to read config file {0}: {1}")]
    ConfigReadFailed(String, String),

    /// Configuration file is not valid TOML for `BenchConfig`
    #[error("failed to parse config file {0}: {1}")]
    ConfigParseFailed(String, String),

    /// A variant returned an error while being measured
    #[error("variant '{variant}' in group '{group}' failed at size {size}: {reason}")]
    VariantFailure {
        group: String,
        variant: String,
        size: usize,
        reason: String,
    },

    /// Two variants of one group disagree on the same dataset
    #[error(
        "variant '{variant}' in group '{group}' disagrees with baseline '{baseline}' at size {size}"
    )]
    ResultMismatch {
        group: String,
        variant: String,
        baseline: String,
        size: usize,
    },

    /// A variant panicked instead of returning an error
    #[error("variant panicked: {0}")]
    VariantPanicked(String),

    /// Age in days does not fit the attribute type
    #[error("age {0} overflows when converted to days")]
    ArithmeticOverflow(i32),

    /// Failed to read `/proc/self/status`
    #[error("failed to read memory metrics from {0}: {1}")]
    MetricsReadFailed(String, String),

    /// Failed to parse a memory value
    #[error("failed to parse memory value from /proc: {0}")]
    MetricsParseError(String),

    /// Failed to write the report log
    #[error("failed to write report to log file: {0}")]
    LogWriteFailed(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
