//! # iterbench - Main entry point
//!
//! Loads configuration, installs a SIGINT handler that stops the sweep between
//! runs, runs the selected experiment groups and prints the report table.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use signal_hook::consts::SIGINT;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use iterbench::{BenchConfig, BenchmarkRunner};

use crate::cli::Cli;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => BenchConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BenchConfig::default(),
    };
    let config = cli.apply_overrides(base);
    config.validate().context("Invalid benchmark configuration")?;

    let cancel = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&cancel))
        .context("Failed to install SIGINT handler")?;

    let groups = cli.selected_groups();
    info!(
        groups = groups.len(),
        sizes = ?config.sizes,
        iterations = config.iterations,
        warmup = config.warmup_iterations,
        "starting sweep"
    );

    let runner = BenchmarkRunner::new(config)
        .with_groups(groups)
        .with_cancel_flag(cancel);
    let report = runner.run().context("Benchmark sweep failed")?;

    println!("{report}");

    if report.failure_count() > 0 {
        warn!(failures = report.failure_count(), "some variants failed");
    }
    if let Some(path) = &runner.config().output_path {
        info!(path = %path.display(), "report rows written");
    }

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
