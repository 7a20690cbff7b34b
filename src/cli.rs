//! CLI definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use clap::{Parser, ValueEnum};
use iterbench::experiments::{counting, filtering, transformation};
use iterbench::{BenchConfig, ExperimentGroup};
use std::path::PathBuf;

/// iterbench - loop style benchmarks
#[derive(Parser, Debug)]
#[command(name = "iterbench")]
#[command(version)]
#[command(about = "Compare loop styles for counting, filtering and transforming records")]
#[command(
    long_about = "Sweeps dataset sizes and times indexed loops, iterator loops and adapter chains over generated customer records. Flags override values from the config file."
)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dataset sizes, comma separated
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub sizes: Option<Vec<i64>>,

    /// Measured invocations per variant and size
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Unmeasured invocations before measuring
    #[arg(short, long)]
    pub warmup: Option<u32>,

    /// Drop samples further than this many standard deviations from the mean
    #[arg(long)]
    pub outlier_sigma: Option<f64>,

    /// Check that variants agree before timing them
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Append report rows to this file as JSON lines
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Groups to run (default: all)
    #[arg(short, long, value_enum)]
    pub group: Vec<GroupName>,
}

/// Built-in experiment groups
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupName {
    Count,
    Filter,
    Transform,
}

impl GroupName {
    fn build(self) -> ExperimentGroup {
        match self {
            Self::Count => counting::group(),
            Self::Filter => filtering::group(),
            Self::Transform => transformation::group(),
        }
    }
}

impl Cli {
    /// Apply flag overrides on top of `base`
    #[must_use]
    pub fn apply_overrides(&self, base: BenchConfig) -> BenchConfig {
        let mut config = base;

        if let Some(sizes) = &self.sizes {
            config.sizes.clone_from(sizes);
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(warmup) = self.warmup {
            config.warmup_iterations = warmup;
        }
        if self.outlier_sigma.is_some() {
            config.outlier_sigma = self.outlier_sigma;
        }
        if self.verify {
            config.verify_results = true;
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }

        config
    }

    /// Groups selected on the command line, in command line order without repeats
    #[must_use]
    pub fn selected_groups(&self) -> Vec<ExperimentGroup> {
        if self.group.is_empty() {
            return iterbench::experiments::all_groups();
        }

        let mut seen = Vec::with_capacity(self.group.len());
        for name in &self.group {
            if !seen.contains(name) {
                seen.push(*name);
            }
        }
        seen.into_iter().map(GroupName::build).collect()
    }
}
