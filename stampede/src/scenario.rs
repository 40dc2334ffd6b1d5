//! Scenario logic and the run loop
use crate::executor::{Timer, VuPool};
use crate::ramp::RampSchedule;
use crate::thresholds::ThresholdSet;
use stampede_core::{RampStage, RunReport, ScenarioConfig, Threshold, TickSet, TICK_INTERVAL};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Load test scenario structure
///
/// Handler for running scenarios. Not intended for manual creation, use the
/// [`#[scenario]`](stampede_macros::scenario) macro which will add these
/// methods to functions.
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = RunReport> + Send>>>,
    config: ScenarioConfig,
}

impl<T> Scenario<T> {
    #[doc(hidden)]
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: ScenarioConfig::new(name),
        }
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send,
{
    type Output = RunReport;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let func = self.func.clone();
            let config = self.config.clone();
            self.runner_fut = Some(Box::pin(async move { run_scenario(func, config).await }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

pub trait ConfigurableScenario<T: Send>: Future<Output = T> + Sized + Send {
    fn stage(self, duration: Duration, target: usize) -> Self;
    fn stages<I>(self, stages: I) -> Self
    where
        I: IntoIterator<Item = RampStage>;
    fn threshold(self, threshold: Threshold) -> Self;
    fn thresholds<I>(self, thresholds: I) -> Self
    where
        I: IntoIterator<Item = Threshold>;
}

impl<T, F> ConfigurableScenario<RunReport> for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send,
{
    /// Append one ramp stage: over `duration`, move linearly to `target` VUs.
    ///
    /// # Example
    /// ```no_run
    /// use stampede::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .stage(Duration::from_secs(5), 100)
    ///         .stage(Duration::from_secs(5), 0)
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn stage(mut self, duration: Duration, target: usize) -> Self {
        self.config.stages.push(RampStage::new(duration, target));
        self
    }

    /// Append a whole ramp at once.
    ///
    /// # Example
    /// ```no_run
    /// use stampede::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     my_scenario()
    ///         .stages([
    ///             RampStage::new(Duration::from_secs(5), 5),
    ///             RampStage::new(Duration::from_secs(5), 100),
    ///         ])
    ///         .await;
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn stages<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = RampStage>,
    {
        self.config.stages.extend(stages);
        self
    }

    /// Declare a pass/fail threshold for the run.
    ///
    /// # Example
    /// ```no_run
    /// use stampede::prelude::*;
    /// use std::time::Duration;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let report = my_scenario()
    ///         .stage(Duration::from_secs(5), 100)
    ///         .threshold(Threshold::error_rate_below(0.01))
    ///         .threshold(Threshold::quantile_below(0.99, Duration::from_secs(2)).abort_on_fail())
    ///         .await;
    ///
    ///     assert!(report.passed());
    /// }
    ///
    /// #[scenario]
    /// async fn my_scenario() {
    /// }
    /// ```
    fn threshold(mut self, threshold: Threshold) -> Self {
        self.config.thresholds.push(threshold);
        self
    }

    /// Declare several thresholds at once.
    fn thresholds<I>(mut self, thresholds: I) -> Self
    where
        I: IntoIterator<Item = Threshold>,
    {
        self.config.thresholds.extend(thresholds);
        self
    }
}

#[instrument(name = "scenario", skip_all, fields(name = %config.name))]
pub(crate) async fn run_scenario<T, F>(scenario: T, config: ScenarioConfig) -> RunReport
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send,
{
    info!("Running {} with config {:?}", config.name, &config);

    let schedule = RampSchedule::new(&config.stages);
    let thresholds = ThresholdSet::new(&config.thresholds);
    let mut pool = VuPool::new(scenario);
    let mut timer = Timer::new(TICK_INTERVAL).await;
    debug!(
        "Schedule runs {} with a {timer} tick.",
        humantime::format_duration(schedule.total_duration())
    );

    let start = Instant::now();
    let mut ticks = TickSet::new();
    let mut aborted = false;

    pool.set_vus(schedule.target_at(Duration::ZERO).unwrap_or(0));

    // NOTE: This loop is time-sensitive. Any long awaits or blocking will
    // distort the ramp.
    loop {
        let tick_elapsed = timer.tick().await;

        let (sample, latencies) = pool.collect(tick_elapsed);
        ticks.push(sample);
        ticks.push_latencies(latencies);

        if let Some(outcome) = thresholds.check_abort(&ticks) {
            warn!(
                "Aborting run: threshold {} breached (observed {:.4}).",
                outcome.threshold, outcome.observed
            );
            aborted = true;
            break;
        }

        match schedule.target_at(start.elapsed()) {
            Some(target) => pool.set_vus(target),
            None => break,
        }
    }

    let checks = pool.checks();
    pool.shutdown();

    let outcomes = thresholds.evaluate_all(&ticks);
    let elapsed = start.elapsed();

    info!("Scenario complete");

    let rates = ticks.tick_rates();
    let (mean_rate, rate_std) = match rates.len() {
        0 => (0., 0.),
        1 => (rates[0], 0.),
        _ => (
            statistical::mean(&rates),
            statistical::standard_deviation(&rates, None),
        ),
    };

    RunReport {
        name: config.name,
        iterations: ticks.total(),
        success_count: ticks.success_total(),
        error_count: ticks.error_total(),
        error_rate: ticks.error_rate(),
        mean_rate,
        rate_std,
        latency_p50: ticks.latency(0.5),
        latency_p90: ticks.latency(0.9),
        latency_p99: ticks.latency(0.99),
        checks,
        thresholds: outcomes,
        elapsed,
        aborted,
    }
}
