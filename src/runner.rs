#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Benchmark driver: sweeps sizes over every variant of every group

use crate::config::BenchConfig;
use crate::dataset;
use crate::error::{BenchError, Result};
use crate::experiments::{self, ExperimentGroup, Outcome, Variant};
use crate::metrics::{MemoryMetrics, TimingStats};
use crate::record::Customer;
use crate::report::{ReportLogger, ReportRow, SweepReport, apply_baseline_ratios};
use chrono::Utc;
use std::any::Any;
use std::hint::black_box;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Measurements for one (variant, size) pair
#[derive(Debug, Clone, PartialEq)]
struct Measurement {
    timing: TimingStats,
    allocated_bytes: usize,
    rss_delta_kb: Option<i64>,
}

/// Runs a sweep, one (group, variant, size) combination at a time
pub struct BenchmarkRunner {
    config: BenchConfig,
    groups: Vec<ExperimentGroup>,
    cancel: Arc<AtomicBool>,
}

impl BenchmarkRunner {
    /// Create a runner over all built-in groups
    #[must_use]
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            groups: experiments::all_groups(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the groups to run
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<ExperimentGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Share a cancellation flag, polled between (variant, size) runs
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Handle that stops the sweep when set
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run the sweep.
    ///
    /// Order is group, then size, then variant. Invalid sizes are skipped and
    /// failing variants are recorded as failed rows; neither stops the sweep.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The configuration is invalid (no sizes, zero iterations)
    /// - Truncating or writing the JSON lines report fails
    pub fn run(&self) -> Result<SweepReport> {
        self.config.validate()?;

        let started_at = Utc::now();
        let logger = self.config.output_path.clone().map(ReportLogger::new);
        if let Some(logger) = &logger {
            logger.reset()?;
        }
        let (sizes, skipped_sizes) = self.resolve_sizes();

        let mut rows = Vec::new();
        let mut cancelled = false;

        'sweep: for group in &self.groups {
            for &size in &sizes {
                if self.is_cancelled() {
                    cancelled = true;
                    break 'sweep;
                }

                info!(group = group.name(), size, "measuring group");
                let rejected = if self.config.verify_results {
                    Self::disagreements(group, size)
                } else {
                    Vec::new()
                };

                let mut size_rows = Vec::with_capacity(group.variants().len());
                for variant in group.variants() {
                    if self.is_cancelled() {
                        cancelled = true;
                        break;
                    }

                    let is_baseline = variant.label() == group.baseline_label();
                    let row = match rejected.iter().find(|(label, _)| *label == variant.label()) {
                        Some((_, reason)) => ReportRow::failed(
                            group.name(),
                            variant.label(),
                            size,
                            is_baseline,
                            reason.clone(),
                        ),
                        None => self.measure_row(group, variant, size, is_baseline),
                    };
                    size_rows.push(row);
                }

                apply_baseline_ratios(&mut size_rows);
                if let Some(logger) = &logger {
                    size_rows.iter().try_for_each(|row| logger.log_row(row))?;
                }
                rows.extend(size_rows);

                if cancelled {
                    break 'sweep;
                }
            }
        }

        if cancelled {
            warn!(completed_rows = rows.len(), "sweep cancelled");
        }

        Ok(SweepReport::new(
            started_at,
            Utc::now(),
            rows,
            skipped_sizes,
            cancelled,
        ))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Split configured sizes into usable lengths and rejected raw values
    fn resolve_sizes(&self) -> (Vec<usize>, Vec<i64>) {
        let mut sizes = Vec::with_capacity(self.config.sizes.len());
        let mut skipped = Vec::new();

        for &raw in &self.config.sizes {
            match dataset::validate_size(raw) {
                Ok(size) => sizes.push(size),
                Err(e) => {
                    warn!(size = raw, error = %e, "skipping sweep entry");
                    skipped.push(raw);
                }
            }
        }

        (sizes, skipped)
    }

    /// Variants whose output differs from the baseline, with the reason
    fn disagreements(group: &ExperimentGroup, size: usize) -> Vec<(&'static str, String)> {
        let customers = match dataset::generate(size) {
            Ok(customers) => customers,
            Err(e) => {
                return group
                    .variants()
                    .iter()
                    .map(|v| (v.label(), e.to_string()))
                    .collect();
            }
        };

        let Some(baseline) = group.baseline() else {
            return Vec::new();
        };
        let expected = run_isolated(baseline, &customers);

        group
            .variants()
            .iter()
            .filter_map(|variant| match (&expected, run_isolated(variant, &customers)) {
                (_, Err(e)) => Some((variant.label(), e.to_string())),
                (Ok(expected), Ok(actual)) if *expected != actual => {
                    let mismatch = BenchError::ResultMismatch {
                        group: group.name().to_string(),
                        variant: variant.label().to_string(),
                        baseline: baseline.label().to_string(),
                        size,
                    };
                    error!(error = %mismatch, "variants disagree");
                    Some((variant.label(), mismatch.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn measure_row(
        &self,
        group: &ExperimentGroup,
        variant: &Variant,
        size: usize,
        is_baseline: bool,
    ) -> ReportRow {
        match self.measure(variant, size) {
            Ok(m) => {
                debug!(
                    group = group.name(),
                    variant = variant.label(),
                    size,
                    mean_ns = m.timing.mean_ns(),
                    std_dev_ns = m.timing.std_dev_ns(),
                    "measured"
                );
                ReportRow::measured(
                    group.name(),
                    variant.label(),
                    size,
                    is_baseline,
                    m.timing,
                    m.allocated_bytes,
                    m.rss_delta_kb,
                )
            }
            Err(e) => {
                let failure = BenchError::VariantFailure {
                    group: group.name().to_string(),
                    variant: variant.label().to_string(),
                    size,
                    reason: e.to_string(),
                };
                warn!(error = %failure, "variant failed, excluding from statistics");
                ReportRow::failed(group.name(), variant.label(), size, is_baseline, e.to_string())
            }
        }
    }

    /// Warm up, then time `iterations` invocations, each on a fresh dataset
    fn measure(&self, variant: &Variant, size: usize) -> Result<Measurement> {
        for _ in 0..self.config.warmup_iterations {
            let customers = dataset::generate(size)?;
            black_box(run_isolated(variant, black_box(&customers))?);
        }

        let capacity = usize::try_from(self.config.iterations).unwrap_or_default();
        let mut samples = Vec::with_capacity(capacity);
        let mut rss_deltas = Vec::with_capacity(capacity);
        let mut allocated_bytes = 0;

        for _ in 0..self.config.iterations {
            let customers = dataset::generate(size)?;
            let before = MemoryMetrics::sample().ok();

            let start = Instant::now();
            let outcome = run_isolated(variant, black_box(&customers));
            let elapsed = start.elapsed();
            let outcome = black_box(outcome)?;

            if let (Some(before), Ok(after)) = (before, MemoryMetrics::sample()) {
                rss_deltas.push(after.rss_delta_kb(&before));
            }
            allocated_bytes = outcome.allocated_bytes();
            samples.push(elapsed);
        }

        let timing = TimingStats::from_samples(&samples, self.config.outlier_sigma)
            .ok_or_else(|| BenchError::InvalidConfig("no samples were taken".to_string()))?;

        let rss_delta_kb = if rss_deltas.len() == samples.len() {
            i64::try_from(rss_deltas.len())
                .ok()
                .and_then(|n| rss_deltas.iter().sum::<i64>().checked_div(n))
        } else {
            None
        };

        Ok(Measurement {
            timing,
            allocated_bytes,
            rss_delta_kb,
        })
    }
}

/// Run a variant, turning a panic into [`BenchError::VariantPanicked`]
fn run_isolated(variant: &Variant, customers: &[Customer]) -> Result<Outcome> {
    catch_unwind(AssertUnwindSafe(|| variant.run(customers)))
        .unwrap_or_else(|payload| Err(BenchError::VariantPanicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
