use crate::Threshold;
use std::fmt;
use std::time::Duration;

/// End-of-run summary for a scenario.
///
/// Everything the run observed: iteration totals, the measured error rate and
/// latency quantiles, per-check pass/fail counts, and the outcome of every
/// declared threshold.
#[derive(Debug)]
pub struct RunReport {
    pub name: String,
    pub iterations: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    /// Mean iterations-per-second across executor ticks.
    pub mean_rate: f64,
    pub rate_std: f64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    pub checks: Vec<CheckStats>,
    pub thresholds: Vec<ThresholdOutcome>,
    pub elapsed: Duration,
    /// Set when an abort-enabled threshold stopped the run early.
    pub aborted: bool,
}

impl RunReport {
    /// True iff every declared threshold passed and the run ran to the end of
    /// its schedule.
    pub fn passed(&self) -> bool {
        !self.aborted && self.thresholds.iter().all(|t| t.passed)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "scenario {} {} in {}",
            self.name,
            if self.aborted {
                "ABORTED"
            } else if self.passed() {
                "passed"
            } else {
                "FAILED"
            },
            humantime::format_duration(Duration::from_secs(self.elapsed.as_secs())),
        )?;
        writeln!(
            f,
            "  iterations: {} ({:.2}/s mean, {:.2} std), errors: {} ({:.2}%)",
            self.iterations,
            self.mean_rate,
            self.rate_std,
            self.error_count,
            self.error_rate * 100.,
        )?;
        writeln!(
            f,
            "  latency: p50={:?}, p90={:?}, p99={:?}",
            self.latency_p50, self.latency_p90, self.latency_p99,
        )?;
        for check in &self.checks {
            writeln!(
                f,
                "  check {:?}: {} passed, {} failed",
                check.name, check.passes, check.fails
            )?;
        }
        for outcome in &self.thresholds {
            writeln!(
                f,
                "  threshold {}: {} (observed {:.4})",
                outcome.threshold,
                if outcome.passed { "pass" } else { "FAIL" },
                outcome.observed,
            )?;
        }
        Ok(())
    }
}

/// Aggregated pass/fail counts for one named check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckStats {
    pub name: &'static str,
    pub passes: u64,
    pub fails: u64,
}

impl CheckStats {
    pub fn pass_rate(&self) -> f64 {
        let total = self.passes + self.fails;
        if total == 0 {
            0.
        } else {
            self.passes as f64 / total as f64
        }
    }
}

/// Result of evaluating one threshold against the finished run.
#[derive(Clone, Debug)]
pub struct ThresholdOutcome {
    pub threshold: Threshold,
    pub observed: f64,
    pub passed: bool,
}
