use stampede_core::{
    Threshold, ThresholdMetric, ThresholdOutcome, TickSet, MIN_SAMPLES_FOR_ABORT,
};

/// Evaluates the declared thresholds against the accumulating measurements.
///
/// The thresholds themselves are plain declarative data; all pass/fail logic
/// lives here. Abort-enabled thresholds are re-checked every tick, the rest
/// only once at the end of the run.
pub(crate) struct ThresholdSet {
    thresholds: Vec<Threshold>,
}

impl ThresholdSet {
    pub fn new(thresholds: &[Threshold]) -> Self {
        Self {
            thresholds: thresholds.to_vec(),
        }
    }

    /// Mid-run evaluation of abort-enabled thresholds only. Returns the first
    /// breached one, or `None` while the run may continue. Not evaluated
    /// until a minimum number of requests has been observed.
    pub fn check_abort(&self, ticks: &TickSet) -> Option<ThresholdOutcome> {
        if ticks.total() < MIN_SAMPLES_FOR_ABORT {
            return None;
        }

        self.thresholds
            .iter()
            .filter(|t| t.abort_on_fail)
            .map(|t| evaluate(t, ticks))
            .find(|outcome| !outcome.passed)
    }

    /// End-of-run evaluation of every declared threshold.
    pub fn evaluate_all(&self, ticks: &TickSet) -> Vec<ThresholdOutcome> {
        self.thresholds
            .iter()
            .map(|t| evaluate(t, ticks))
            .collect()
    }
}

fn evaluate(threshold: &Threshold, ticks: &TickSet) -> ThresholdOutcome {
    let observed = match threshold.metric {
        ThresholdMetric::ErrorRate => ticks.error_rate(),
        ThresholdMetric::LatencyQuantile(quantile) => ticks.latency(quantile).as_secs_f64(),
        ThresholdMetric::MeanLatency => ticks.mean_latency().as_secs_f64(),
    };

    ThresholdOutcome {
        threshold: threshold.clone(),
        observed,
        passed: observed < threshold.bound,
    }
}
