#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Configuration for a benchmark sweep

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sizes swept when nothing else is configured
pub const DEFAULT_SIZES: [i64; 12] = [
    100_000, 200_000, 300_000, 400_000, 500_000, 600_000, 700_000, 800_000, 900_000, 1_000_000,
    2_000_000, 3_000_000,
];

/// Configuration for a benchmark sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Dataset lengths to test, in order.
    ///
    /// Kept signed so that bad entries survive parsing and can be skipped
    /// individually by the runner.
    #[serde(default = "default_sizes")]
    pub sizes: Vec<i64>,

    /// Measured invocations per (variant, size) pair.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Unmeasured invocations before measuring.
    #[serde(default = "default_warmup_iterations")]
    pub warmup_iterations: u32,

    /// Reject samples further than this many standard deviations from the mean.
    #[serde(default)]
    pub outlier_sigma: Option<f64>,

    /// Check that variants agree before timing each (group, size).
    #[serde(default)]
    pub verify_results: bool,

    /// Write report rows to this file as JSON lines.
    ///
    /// The file is truncated when a run starts, then rows are appended as
    /// each (group, size) batch completes.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            iterations: default_iterations(),
            warmup_iterations: default_warmup_iterations(),
            outlier_sigma: None,
            verify_results: false,
            output_path: None,
        }
    }
}

impl BenchConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the size sweep
    #[must_use]
    pub fn with_sizes(mut self, sizes: Vec<i64>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set measured and warmup iteration counts
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32, warmup_iterations: u32) -> Self {
        self.iterations = iterations;
        self.warmup_iterations = warmup_iterations;
        self
    }

    /// Enable outlier rejection
    #[must_use]
    pub fn with_outlier_sigma(mut self, sigma: f64) -> Self {
        self.outlier_sigma = Some(sigma);
        self
    }

    /// Enable runtime agreement checks
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_results = verify;
        self
    }

    /// Write report rows to `path`
    #[must_use]
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    /// Load a config from a TOML file.
    ///
    /// Missing keys take their defaults. The result is not validated.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML is malformed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::ConfigReadFailed(path.display().to_string(), e.to_string())
        })?;

        Self::from_toml(&content)
            .map_err(|e| BenchError::ConfigParseFailed(path.display().to_string(), e.to_string()))
    }

    /// Parse a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validate the configuration.
    ///
    /// Individual non-positive sizes are not rejected here; the runner skips
    /// them with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidConfig`] if:
    /// - No sizes are given
    /// - `iterations` is 0
    /// - `outlier_sigma` is not a positive finite number
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::InvalidConfig(
                "at least one size is required".to_string(),
            ));
        }

        if self.iterations == 0 {
            return Err(BenchError::InvalidConfig(
                "iterations must be greater than 0".to_string(),
            ));
        }

        match self.outlier_sigma {
            Some(sigma) if !sigma.is_finite() || sigma <= 0.0 => Err(BenchError::InvalidConfig(
                format!("outlier_sigma must be a positive number, got {sigma}"),
            )),
            _ => Ok(()),
        }
    }
}

fn default_sizes() -> Vec<i64> {
    DEFAULT_SIZES.to_vec()
}

const fn default_iterations() -> u32 {
    15
}

const fn default_warmup_iterations() -> u32 {
    3
}
