use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Declarative description of a scenario run: the VU ramp and the pass/fail
/// thresholds. Built up by the scenario methods and never mutated once the
/// run starts.
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub name: String,
    pub stages: Vec<RampStage>,
    pub thresholds: Vec<Threshold>,
}

impl ScenarioConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stages: vec![],
            thresholds: vec![],
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}

/// One step of the VU ramp: over `duration`, move linearly from the previous
/// stage's target to `target` concurrent VUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RampStage {
    pub duration: Duration,
    pub target: usize,
}

impl RampStage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

impl fmt::Display for RampStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} VUs",
            humantime::format_duration(self.duration),
            self.target
        )
    }
}

/// Run-level metric a [`Threshold`] is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdMetric {
    /// Fraction of iterations which ended in an error.
    ErrorRate,
    /// Request latency at the given quantile (`0.0..=1.0`).
    LatencyQuantile(f64),
    /// Mean request latency.
    MeanLatency,
}

/// A pass/fail predicate over an aggregated run metric.
///
/// The `bound` is an upper bound: error rates are plain fractions, latency
/// bounds are stored in seconds. Also parseable from the compact expression
/// syntax used by declarative load-test configs: `rate<0.01`, `p(99)<2000`,
/// `avg<300` (latency bounds in milliseconds).
#[derive(Clone, Debug, PartialEq)]
pub struct Threshold {
    pub metric: ThresholdMetric,
    pub bound: f64,
    pub abort_on_fail: bool,
}

impl Threshold {
    /// Pass iff the run error rate stays below `bound`.
    pub fn error_rate_below(bound: f64) -> Self {
        Self {
            metric: ThresholdMetric::ErrorRate,
            bound,
            abort_on_fail: false,
        }
    }

    /// Pass iff the latency at `quantile` (`0.0..=1.0`) stays below `bound`.
    pub fn quantile_below(quantile: f64, bound: Duration) -> Self {
        Self {
            metric: ThresholdMetric::LatencyQuantile(quantile),
            bound: bound.as_secs_f64(),
            abort_on_fail: false,
        }
    }

    /// Pass iff the mean request latency stays below `bound`.
    pub fn mean_latency_below(bound: Duration) -> Self {
        Self {
            metric: ThresholdMetric::MeanLatency,
            bound: bound.as_secs_f64(),
            abort_on_fail: false,
        }
    }

    /// Stop the run as soon as this threshold is breached, rather than only
    /// reporting the failure at the end.
    pub fn abort_on_fail(mut self) -> Self {
        self.abort_on_fail = true;
        self
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rescaling fractions back to percent/milliseconds reintroduces float
        // noise (0.99 * 100 != 99 exactly), so round before printing.
        fn rescale(value: f64, factor: f64) -> f64 {
            (value * factor * 1e9).round() / 1e9
        }

        match self.metric {
            ThresholdMetric::ErrorRate => write!(f, "rate<{}", self.bound),
            ThresholdMetric::LatencyQuantile(q) => {
                write!(f, "p({})<{}", rescale(q, 100.), rescale(self.bound, 1000.))
            }
            ThresholdMetric::MeanLatency => write!(f, "avg<{}", rescale(self.bound, 1000.)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThresholdParseError {
    #[error("threshold expression has no '<' comparator: {0:?}")]
    MissingComparator(String),
    #[error("unknown threshold metric: {0:?}")]
    UnknownMetric(String),
    #[error("quantile must be a number in 0..=100: {0:?}")]
    InvalidQuantile(String),
    #[error("invalid threshold bound: {0:?}")]
    InvalidBound(String),
}

impl FromStr for Threshold {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (metric, bound) = s
            .split_once('<')
            .ok_or_else(|| ThresholdParseError::MissingComparator(s.to_string()))?;
        let metric = metric.trim();
        let bound: f64 = bound
            .trim()
            .parse()
            .map_err(|_| ThresholdParseError::InvalidBound(bound.trim().to_string()))?;

        match metric {
            "rate" => Ok(Self::error_rate_below(bound)),
            "avg" => Ok(Self::mean_latency_below(Duration::from_secs_f64(
                bound / 1000.,
            ))),
            m if m.starts_with("p(") && m.ends_with(')') => {
                let quantile = &m[2..m.len() - 1];
                let quantile: f64 = quantile
                    .parse()
                    .map_err(|_| ThresholdParseError::InvalidQuantile(quantile.to_string()))?;
                if !(0. ..=100.).contains(&quantile) {
                    return Err(ThresholdParseError::InvalidQuantile(quantile.to_string()));
                }
                Ok(Self::quantile_below(
                    quantile / 100.,
                    Duration::from_secs_f64(bound / 1000.),
                ))
            }
            _ => Err(ThresholdParseError::UnknownMetric(metric.to_string())),
        }
    }
}
