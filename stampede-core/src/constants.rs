use std::time::Duration;

/// Cadence at which the executor re-targets the VU pool and drains counters.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Minimum recorded requests before abort-enabled thresholds are evaluated,
/// so a run is never aborted off a one-request quantile.
pub const MIN_SAMPLES_FOR_ABORT: u64 = 10;
