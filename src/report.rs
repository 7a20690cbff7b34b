#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Sweep results, baseline ratios and rendering

use crate::error::{BenchError, Result};
use crate::metrics::TimingStats;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Outcome of measuring one (group, variant, size) triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// All measured invocations succeeded
    Measured {
        timing: TimingStats,

        /// Bytes held by the result buffer of the last invocation
        allocated_bytes: usize,

        /// Mean RSS change across an invocation, when `/proc` is readable
        rss_delta_kb: Option<i64>,

        /// Mean time relative to the group's baseline at the same size
        ratio: Option<f64>,
    },

    /// The pair was excluded from statistics
    Failed { reason: String },
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    group: String,
    variant: String,
    size: usize,
    baseline: bool,
    #[serde(flatten)]
    status: RowStatus,
}

impl ReportRow {
    /// Row for a successfully measured pair. The ratio is filled in later.
    #[must_use]
    pub fn measured(
        group: &str,
        variant: &str,
        size: usize,
        baseline: bool,
        timing: TimingStats,
        allocated_bytes: usize,
        rss_delta_kb: Option<i64>,
    ) -> Self {
        Self {
            group: group.to_string(),
            variant: variant.to_string(),
            size,
            baseline,
            status: RowStatus::Measured {
                timing,
                allocated_bytes,
                rss_delta_kb,
                ratio: None,
            },
        }
    }

    /// Row for a pair that failed
    #[must_use]
    pub fn failed(group: &str, variant: &str, size: usize, baseline: bool, reason: String) -> Self {
        Self {
            group: group.to_string(),
            variant: variant.to_string(),
            size,
            baseline,
            status: RowStatus::Failed { reason },
        }
    }

    /// Get the group name
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Get the variant label
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Get the dataset size
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether this row is the group's baseline
    #[must_use]
    pub const fn is_baseline(&self) -> bool {
        self.baseline
    }

    /// Get the status
    #[must_use]
    pub const fn status(&self) -> &RowStatus {
        &self.status
    }

    /// Timing statistics, if measured
    #[must_use]
    pub const fn timing(&self) -> Option<&TimingStats> {
        match &self.status {
            RowStatus::Measured { timing, .. } => Some(timing),
            RowStatus::Failed { .. } => None,
        }
    }

    /// Ratio to baseline, if measured and the baseline was measured
    #[must_use]
    pub const fn ratio(&self) -> Option<f64> {
        match &self.status {
            RowStatus::Measured { ratio, .. } => *ratio,
            RowStatus::Failed { .. } => None,
        }
    }

    /// Whether the pair failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, RowStatus::Failed { .. })
    }

    fn set_ratio(&mut self, baseline_mean_ns: Option<f64>) {
        if let RowStatus::Measured { timing, ratio, .. } = &mut self.status {
            *ratio = baseline_mean_ns
                .filter(|mean| *mean > 0.0)
                .map(|mean| timing.mean_ns() / mean);
        }
    }
}

/// Fill in baseline ratios for rows that share one group and size.
///
/// Rows whose baseline failed keep `ratio: None`.
pub fn apply_baseline_ratios(rows: &mut [ReportRow]) {
    let baseline_mean = rows
        .iter()
        .find(|row| row.is_baseline())
        .and_then(ReportRow::timing)
        .map(TimingStats::mean_ns);

    rows.iter_mut()
        .for_each(|row| row.set_ratio(baseline_mean));
}

/// Everything produced by one sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    rows: Vec<ReportRow>,
    skipped_sizes: Vec<i64>,
    cancelled: bool,
}

impl SweepReport {
    /// Create a report
    #[must_use]
    pub const fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        rows: Vec<ReportRow>,
        skipped_sizes: Vec<i64>,
        cancelled: bool,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            rows,
            skipped_sizes,
            cancelled,
        }
    }

    /// Get the rows in measurement order
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Find the row for a triple
    #[must_use]
    pub fn row(&self, group: &str, variant: &str, size: usize) -> Option<&ReportRow> {
        self.rows
            .iter()
            .find(|r| r.group() == group && r.variant() == variant && r.size() == size)
    }

    /// Configured sizes that were rejected
    #[must_use]
    pub fn skipped_sizes(&self) -> &[i64] {
        &self.skipped_sizes
    }

    /// Whether the sweep stopped early
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Get the start time
    #[must_use]
    pub const fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at
    }

    /// Get the finish time
    #[must_use]
    pub const fn finished_at(&self) -> &DateTime<Utc> {
        &self.finished_at
    }

    /// Number of failed rows
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_failed()).count()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (group, rows) in &self.rows.iter().chunk_by(|row| row.group().to_string()) {
            writeln!(f, "## {group}")?;
            writeln!(
                f,
                "{:<16} {:>10} {:>12} {:>12} {:>12} {:>7} {:>12} {:>10}",
                "Variant", "Size", "Mean", "StdDev", "Median", "Ratio", "Allocated", "RSS delta"
            )?;

            for row in rows {
                match row.status() {
                    RowStatus::Measured {
                        timing,
                        allocated_bytes,
                        rss_delta_kb,
                        ratio,
                    } => writeln!(
                        f,
                        "{:<16} {:>10} {:>12} {:>12} {:>12} {:>7} {:>12} {:>10}",
                        row.variant(),
                        row.size(),
                        format_nanos(timing.mean_ns()),
                        format_nanos(timing.std_dev_ns()),
                        format_nanos(timing.median_ns()),
                        ratio.map_or_else(|| "?".to_string(), |r| format!("{r:.2}")),
                        format_bytes(*allocated_bytes),
                        rss_delta_kb.map_or_else(|| "-".to_string(), |kb| format!("{kb} KB")),
                    )?,
                    RowStatus::Failed { reason } => writeln!(
                        f,
                        "{:<16} {:>10} FAILED: {reason}",
                        row.variant(),
                        row.size()
                    )?,
                }
            }
            writeln!(f)?;
        }

        if !self.skipped_sizes.is_empty() {
            writeln!(
                f,
                "Skipped sizes: {}",
                self.skipped_sizes.iter().join(", ")
            )?;
        }
        if self.cancelled {
            writeln!(f, "Sweep cancelled before completion")?;
        }
        write!(
            f,
            "Finished in {}s",
            (self.finished_at - self.started_at).num_seconds()
        )
    }
}

/// Render nanoseconds with a readable unit
#[must_use]
pub fn format_nanos(ns: f64) -> String {
    if ns < 1e3 {
        format!("{ns:.1} ns")
    } else if ns < 1e6 {
        format!("{:.2} us", ns / 1e3)
    } else if ns < 1e9 {
        format!("{:.2} ms", ns / 1e6)
    } else {
        format!("{:.3} s", ns / 1e9)
    }
}

/// Render a byte count with a readable unit
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn format_bytes(bytes: usize) -> String {
    let value = bytes as f64;
    if bytes == 0 {
        "-".to_string()
    } else if value < 1024.0 {
        format!("{bytes} B")
    } else if value < 1024.0 * 1024.0 {
        format!("{:.2} KB", value / 1024.0)
    } else {
        format!("{:.2} MB", value / (1024.0 * 1024.0))
    }
}

/// Appends report rows to a file as JSON lines
pub struct ReportLogger {
    output_path: PathBuf,
}

impl ReportLogger {
    /// Create a new report logger
    #[must_use]
    pub const fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Create the log file, or empty it if it already exists
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or truncated
    pub fn reset(&self) -> Result<()> {
        File::create(&self.output_path).map_err(|e| BenchError::LogWriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Append one row (JSON lines format)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be written or JSON serialization fails
    pub fn log_row(&self, row: &ReportRow) -> Result<()> {
        use std::io::Write;

        let json = serde_json::to_string(row)?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .map_err(|e| BenchError::LogWriteFailed(e.to_string()))?;

        writeln!(file, "{json}").map_err(|e| BenchError::LogWriteFailed(e.to_string()))?;

        Ok(())
    }

    /// Read all rows from the log file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or JSON parsing fails
    pub fn read_rows(&self) -> Result<Vec<ReportRow>> {
        if !Path::new(&self.output_path).exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.output_path).map_err(|e| BenchError::IoError(e.to_string()))?;

        BufReader::new(file)
            .lines()
            .map(|line_result| {
                let line = line_result.map_err(|e| BenchError::IoError(e.to_string()))?;
                serde_json::from_str(&line).map_err(Into::into)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn measured(variant: &str, baseline: bool, millis: u64) -> std::result::Result<ReportRow, String> {
        TimingStats::from_samples(&[Duration::from_millis(millis)], None)
            .map(|timing| ReportRow::measured("filter", variant, 1_000, baseline, timing, 64, None))
            .ok_or_else(|| "no samples".to_string())
    }

    #[test]
    fn test_ratios_relative_to_baseline() -> TestResult {
        let mut rows = vec![
            measured("for", true, 10)?,
            measured("for-in", false, 20)?,
            measured("filter collect", false, 5)?,
        ];
        apply_baseline_ratios(&mut rows);

        let ratios: Vec<Option<f64>> = rows.iter().map(ReportRow::ratio).collect();
        assert_eq!(ratios.len(), 3);
        assert!(ratios.first().copied().flatten().is_some_and(|r| (r - 1.0).abs() < 1e-9));
        assert!(ratios.get(1).copied().flatten().is_some_and(|r| (r - 2.0).abs() < 1e-9));
        assert!(ratios.get(2).copied().flatten().is_some_and(|r| (r - 0.5).abs() < 1e-9));
        Ok(())
    }

    #[test]
    fn test_failed_baseline_leaves_ratios_empty() -> TestResult {
        let mut rows = vec![
            ReportRow::failed("filter", "for", 1_000, true, "boom".to_string()),
            measured("for-in", false, 20)?,
        ];
        apply_baseline_ratios(&mut rows);

        assert!(rows.iter().all(|r| r.ratio().is_none()));
        assert!(rows.first().is_some_and(ReportRow::is_failed));
        Ok(())
    }

    #[test]
    fn test_format_nanos_units() {
        assert_eq!(format_nanos(512.0), "512.0 ns");
        assert_eq!(format_nanos(1_500.0), "1.50 us");
        assert_eq!(format_nanos(2_500_000.0), "2.50 ms");
        assert_eq!(format_nanos(3_000_000_000.0), "3.000 s");
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0), "-");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_display_lists_failures_and_skips() -> TestResult {
        let now = Utc::now();
        let mut rows = vec![
            measured("for", true, 10)?,
            ReportRow::failed("filter", "for-in", 1_000, false, "boom".to_string()),
        ];
        apply_baseline_ratios(&mut rows);
        let report = SweepReport::new(now, now, rows, vec![-3], false);

        let text = report.to_string();
        assert!(text.contains("## filter"));
        assert!(text.contains("FAILED: boom"));
        assert!(text.contains("Skipped sizes: -3"));
        assert!(text.contains("1.00"));
        assert_eq!(report.failure_count(), 1);
        Ok(())
    }

    #[test]
    fn test_report_logger_roundtrip() -> TestResult {
        let file = NamedTempFile::new()?;
        let logger = ReportLogger::new(file.path().to_path_buf());
        let mut rows = vec![
            measured("for", true, 10)?,
            measured("for-in", false, 30)?,
            ReportRow::failed("filter", "filter collect", 1_000, false, "boom".to_string()),
        ];
        apply_baseline_ratios(&mut rows);

        for row in &rows {
            logger.log_row(row)?;
        }

        assert_eq!(logger.read_rows()?, rows);
        Ok(())
    }

    #[test]
    fn test_reset_clears_earlier_rows() -> TestResult {
        let file = NamedTempFile::new()?;
        let logger = ReportLogger::new(file.path().to_path_buf());
        logger.log_row(&measured("for", true, 10)?)?;

        logger.reset()?;
        assert!(logger.read_rows()?.is_empty());

        logger.log_row(&measured("for-in", false, 20)?)?;
        let rows = logger.read_rows()?;
        assert_eq!(rows.len(), 1);
        assert!(rows.first().is_some_and(|r| r.variant() == "for-in"));
        Ok(())
    }

    #[test]
    fn test_read_rows_missing_file() {
        let logger = ReportLogger::new(PathBuf::from("/nonexistent/iterbench-report.jsonl"));
        assert_eq!(logger.read_rows(), Ok(Vec::new()));
    }
}
