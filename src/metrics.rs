#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! Timing statistics and process memory sampling

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// Summary of the measured invocations of one (variant, size) pair.
///
/// All times are in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    mean_ns: f64,
    std_dev_ns: f64,
    median_ns: f64,
    min_ns: f64,
    max_ns: f64,
    samples: usize,
    outliers_removed: usize,
}

impl TimingStats {
    /// Compute statistics from raw samples.
    ///
    /// When `outlier_sigma` is set, samples further than that many standard
    /// deviations from the mean are dropped and the statistics recomputed.
    /// Rejection never removes every sample.
    ///
    /// Returns `None` if `samples` is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // exact below ~104 days per sample
    pub fn from_samples(samples: &[Duration], outlier_sigma: Option<f64>) -> Option<Self> {
        let nanos: Vec<f64> = samples.iter().map(|d| d.as_nanos() as f64).collect();
        let all = Self::summarize(nanos.clone(), 0)?;

        let Some(sigma) = outlier_sigma else {
            return Some(all);
        };

        let lower = sigma.mul_add(-all.std_dev_ns, all.mean_ns);
        let upper = sigma.mul_add(all.std_dev_ns, all.mean_ns);
        let kept: Vec<f64> = nanos
            .iter()
            .copied()
            .filter(|ns| (lower..=upper).contains(ns))
            .collect();

        let removed = nanos.len().saturating_sub(kept.len());
        if removed == 0 || kept.is_empty() {
            return Some(all);
        }
        Self::summarize(kept, removed)
    }

    #[allow(clippy::cast_precision_loss)] // sample counts are far below 2^52
    fn summarize(mut nanos: Vec<f64>, outliers_removed: usize) -> Option<Self> {
        nanos.sort_by(f64::total_cmp);
        let min_ns = *nanos.first()?;
        let max_ns = *nanos.last()?;
        let len = nanos.len();

        let mean_ns = nanos.iter().sum::<f64>() / len as f64;
        let variance = nanos
            .iter()
            .map(|ns| (ns - mean_ns).powi(2))
            .sum::<f64>()
            / len as f64;

        let mid = len / 2;
        let median_ns = if len % 2 == 0 {
            let lo = nanos.get(mid.saturating_sub(1))?;
            let hi = nanos.get(mid)?;
            (lo + hi) / 2.0
        } else {
            *nanos.get(mid)?
        };

        Some(Self {
            mean_ns,
            std_dev_ns: variance.sqrt(),
            median_ns,
            min_ns,
            max_ns,
            samples: len,
            outliers_removed,
        })
    }

    /// Get the mean
    #[must_use]
    pub const fn mean_ns(&self) -> f64 {
        self.mean_ns
    }

    /// Get the population standard deviation
    #[must_use]
    pub const fn std_dev_ns(&self) -> f64 {
        self.std_dev_ns
    }

    /// Get the median
    #[must_use]
    pub const fn median_ns(&self) -> f64 {
        self.median_ns
    }

    /// Get the fastest sample
    #[must_use]
    pub const fn min_ns(&self) -> f64 {
        self.min_ns
    }

    /// Get the slowest sample
    #[must_use]
    pub const fn max_ns(&self) -> f64 {
        self.max_ns
    }

    /// Number of samples the statistics were computed from
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Number of samples rejected as outliers
    #[must_use]
    pub const fn outliers_removed(&self) -> usize {
        self.outliers_removed
    }
}

/// Metric field types from /proc status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricType {
    VmRss,
    VmHwm,
}

/// Resident memory of the current process, from `/proc/self/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Resident Set Size in kilobytes
    rss: u64,

    /// Peak RSS in kilobytes
    rss_peak: u64,
}

impl MemoryMetrics {
    /// Create new memory metrics
    #[must_use]
    pub const fn new(rss: u64, rss_peak: u64) -> Self {
        Self { rss, rss_peak }
    }

    /// Get RSS in kilobytes
    #[must_use]
    pub const fn rss_kb(&self) -> u64 {
        self.rss
    }

    /// Get peak RSS in kilobytes
    #[must_use]
    pub const fn rss_peak_kb(&self) -> u64 {
        self.rss_peak
    }

    /// Signed RSS change from `earlier` to `self`, in kilobytes
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // RSS in kB stays far below i64::MAX
    pub const fn rss_delta_kb(&self, earlier: &Self) -> i64 {
        (self.rss as i64).saturating_sub(earlier.rss as i64)
    }

    /// Sample the current process.
    ///
    /// # Errors
    ///
    /// Returns error if `/proc/self/status` is unavailable (non-Linux) or malformed.
    pub fn sample() -> Result<Self> {
        Self::read_from_file(Path::new("/proc/self/status"))
    }

    /// Read metrics from a status file (testable)
    fn read_from_file(path: &Path) -> Result<Self> {
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| {
            BenchError::MetricsReadFailed(source.clone(), format!("failed to open: {e}"))
        })?;

        let reader = BufReader::new(file);

        #[derive(Debug, Default)]
        struct MetricsAccumulator {
            rss_kb: Option<u64>,
            rss_peak_kb: Option<u64>,
        }

        let accumulator = reader
            .lines()
            .map(|line_result| {
                line_result.map_err(|e| {
                    BenchError::MetricsReadFailed(source.clone(), format!("failed to read line: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter_map(|line| Self::parse_proc_line(&line).transpose())
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .fold(
                MetricsAccumulator::default(),
                |mut acc, (metric_type, value)| {
                    match metric_type {
                        MetricType::VmRss => acc.rss_kb = Some(value),
                        MetricType::VmHwm => acc.rss_peak_kb = Some(value),
                    }
                    acc
                },
            );

        let rss_kb = accumulator
            .rss_kb
            .ok_or_else(|| BenchError::MetricsReadFailed(source.clone(), "VmRSS not found".to_string()))?;

        // VmHWM is missing on some kernels; fall back to the current RSS
        let rss_peak_kb = accumulator.rss_peak_kb.unwrap_or(rss_kb);

        Ok(Self::new(rss_kb, rss_peak_kb))
    }

    /// Parse a single /proc status line into a metric type and value
    /// Format: "`FieldName`:    12345 kB"
    ///
    /// Returns None if the line is not a recognized metric field
    fn parse_proc_line(line: &str) -> Result<Option<(MetricType, u64)>> {
        let Some(metric_type) = (if line.starts_with("VmRSS:") {
            Some(MetricType::VmRss)
        } else if line.starts_with("VmHWM:") {
            Some(MetricType::VmHwm)
        } else {
            None
        }) else {
            return Ok(None);
        };

        let value = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| {
                BenchError::MetricsParseError(format!("missing value in line: {line}"))
            })?
            .parse::<u64>()
            .map_err(|e| {
                BenchError::MetricsParseError(format!("failed to parse value in '{line}': {e}"))
            })?;

        Ok(Some((metric_type, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn millis(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_empty_samples() {
        assert!(TimingStats::from_samples(&[], None).is_none());
    }

    #[test]
    fn test_basic_statistics() {
        let stats = TimingStats::from_samples(&millis(&[2, 4, 4, 4, 5, 5, 7, 9]), None);
        assert!(stats.is_some());

        if let Some(s) = stats {
            assert!((s.mean_ns() - 5e6).abs() < 1.0);
            assert!((s.std_dev_ns() - 2e6).abs() < 1.0);
            assert!((s.median_ns() - 4.5e6).abs() < 1.0);
            assert!((s.min_ns() - 2e6).abs() < 1.0);
            assert!((s.max_ns() - 9e6).abs() < 1.0);
            assert_eq!(s.samples(), 8);
            assert_eq!(s.outliers_removed(), 0);
        }
    }

    #[test]
    fn test_odd_median() {
        let stats = TimingStats::from_samples(&millis(&[9, 1, 5]), None);
        assert!(stats.is_some_and(|s| (s.median_ns() - 5e6).abs() < 1.0));
    }

    #[test]
    fn test_outlier_rejection() {
        let mut samples = millis(&[10; 20]);
        samples.push(Duration::from_millis(1_000));

        let stats = TimingStats::from_samples(&samples, Some(3.0));
        assert!(stats.is_some());

        if let Some(s) = stats {
            assert_eq!(s.outliers_removed(), 1);
            assert_eq!(s.samples(), 20);
            assert!((s.mean_ns() - 1e7).abs() < 1.0);
            assert!(s.std_dev_ns() < 1.0);
        }
    }

    #[test]
    fn test_identical_samples_keep_everything() {
        let stats = TimingStats::from_samples(&millis(&[3, 3, 3]), Some(1.0));
        assert!(stats.is_some_and(|s| s.samples() == 3 && s.outliers_removed() == 0));
    }

    #[test]
    fn test_rss_delta() {
        let before = MemoryMetrics::new(1_000, 1_200);
        let after = MemoryMetrics::new(900, 1_200);

        assert_eq!(after.rss_delta_kb(&before), -100);
        assert_eq!(before.rss_delta_kb(&after), 100);
    }

    #[test]
    fn test_parse_proc_status() {
        let mut temp_file = NamedTempFile::new().ok().filter(|_| true);
        if let Some(ref mut file) = temp_file {
            let content = "Name:\ttest\nVmHWM:\t   3072 kB\nVmRSS:\t   1024 kB\nVmSize:\t   2048 kB\n";
            let _ = write!(file, "{content}");
            let _ = file.flush();

            let metrics = MemoryMetrics::read_from_file(file.path());
            assert_eq!(metrics, Ok(MemoryMetrics::new(1024, 3072)));
        }
    }

    #[test]
    fn test_parse_missing_rss() {
        let mut temp_file = NamedTempFile::new().ok().filter(|_| true);
        if let Some(ref mut file) = temp_file {
            let _ = write!(file, "Name:\ttest\nVmSize:\t   2048 kB\n");
            let _ = file.flush();

            let metrics = MemoryMetrics::read_from_file(file.path());
            assert!(matches!(metrics, Err(BenchError::MetricsReadFailed(_, _))));
        }
    }

    #[test]
    fn test_parse_bad_value() {
        assert!(matches!(
            MemoryMetrics::parse_proc_line("VmRSS:\t lots kB"),
            Err(BenchError::MetricsParseError(_))
        ));
        assert_eq!(MemoryMetrics::parse_proc_line("Threads:\t4"), Ok(None));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sample_self() {
        let metrics = MemoryMetrics::sample();
        assert!(metrics.is_ok_and(|m| m.rss_kb() > 0 && m.rss_peak_kb() >= m.rss_kb()));
    }
}
