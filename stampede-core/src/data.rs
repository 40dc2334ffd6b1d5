use pdatastructs::tdigest::{TDigest, K1};
use std::time::Duration;
use tracing::error;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Counters drained from the VU pool for one executor tick.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub success_count: u64,
    pub error_count: u64,
    pub elapsed: Duration,
}

impl SampleData {
    pub fn rate(&self) -> f64 {
        self.total() as f64 / self.elapsed.as_nanos() as f64 * 1e9
    }

    pub fn error_rate(&self) -> f64 {
        self.error_count as f64 / self.total() as f64
    }

    pub fn total(&self) -> u64 {
        self.success_count + self.error_count
    }
}

/// Accumulated measurements for a whole run: cumulative totals, per-tick
/// iteration rates, and a latency t-digest for quantile queries.
#[derive(Debug)]
pub struct TickSet {
    samples: Vec<SampleData>,
    latency: TDigest<K1>,
    latency_sum: Duration,
    latency_count: u64,
    success_total: u64,
    error_total: u64,
}

impl TickSet {
    pub fn new() -> Self {
        Self {
            samples: vec![],
            latency: default_tdigest(),
            latency_sum: Duration::ZERO,
            latency_count: 0,
            success_total: 0,
            error_total: 0,
        }
    }

    pub fn push(&mut self, sample: SampleData) {
        self.success_total += sample.success_count;
        self.error_total += sample.error_count;
        self.samples.push(sample);
    }

    /// Separate latency push method since the TDigest datastructure does not
    /// support merge, and is probabilistic in nature.
    pub fn push_latencies(&mut self, mut latencies: Vec<Duration>) {
        for latency in latencies.drain(..) {
            self.latency.insert(latency.as_secs_f64());
            self.latency_sum += latency;
            self.latency_count += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.success_total + self.error_total
    }

    pub fn success_total(&self) -> u64 {
        self.success_total
    }

    pub fn error_total(&self) -> u64 {
        self.error_total
    }

    pub fn error_rate(&self) -> f64 {
        if self.total() == 0 {
            0.
        } else {
            self.error_total as f64 / self.total() as f64
        }
    }

    /// Iteration rate of each recorded tick, for summary statistics.
    pub fn tick_rates(&self) -> Vec<f64> {
        self.samples.iter().map(SampleData::rate).collect()
    }

    pub fn latency(&self, quantile: f64) -> Duration {
        let secs = self.latency.quantile(quantile);

        // TDigest returns NaN when empty, which we need to filter for.
        let secs = if secs.is_finite() {
            secs
        } else {
            if self.latency_count > 0 {
                error!("Non-finite latency quantile despite recorded samples.");
            }
            0.
        };

        Duration::from_secs_f64(secs)
    }

    pub fn mean_latency(&self) -> Duration {
        if self.latency_count == 0 {
            Duration::ZERO
        } else {
            self.latency_sum / self.latency_count as u32
        }
    }
}

impl Default for TickSet {
    fn default() -> Self {
        Self::new()
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(success: u64, error: u64) -> SampleData {
        SampleData {
            success_count: success,
            error_count: error,
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn accumulates_totals() {
        let mut ticks = TickSet::new();
        ticks.push(sample(90, 10));
        ticks.push(sample(10, 90));

        assert_eq!(ticks.total(), 200);
        assert_eq!(ticks.success_total(), 100);
        assert_eq!(ticks.error_total(), 100);
        assert!((ticks.error_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_set_has_zero_error_rate_and_latency() {
        let ticks = TickSet::new();
        assert_eq!(ticks.error_rate(), 0.);
        assert_eq!(ticks.latency(0.99), Duration::ZERO);
        assert_eq!(ticks.mean_latency(), Duration::ZERO);
    }

    #[test]
    fn latency_quantiles_track_pushed_values() {
        let mut ticks = TickSet::new();
        let latencies: Vec<_> = (1..=100).map(Duration::from_millis).collect();
        ticks.push_latencies(latencies);

        let p99 = ticks.latency(0.99);
        assert!(p99 >= Duration::from_millis(90), "p99 was {p99:?}");
        let p50 = ticks.latency(0.5);
        assert!(p50 <= ticks.latency(0.9));
        assert!((ticks.mean_latency().as_millis() as i64 - 50).abs() <= 1);
    }

    #[test]
    fn tick_rate_is_per_second() {
        let data = SampleData {
            success_count: 100,
            error_count: 0,
            elapsed: Duration::from_millis(250),
        };
        assert!((data.rate() - 400.).abs() < 1e-6);
    }
}
