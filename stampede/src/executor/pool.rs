use crate::check::CheckRegistry;
use crate::request::{RequestData, REQUEST_HOOK};
use metrics_util::AtomicBucket;
use stampede_core::{CheckStats, SampleData};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Pool of looping VU tasks sharing one set of measurement counters.
///
/// Each VU is a tokio task which repeatedly invokes the scenario function
/// under the request-hook scope. VUs share nothing but the counters; there
/// is no coordination between them.
pub(crate) struct VuPool<T> {
    scenario: T,
    tasks: Vec<JoinHandle<()>>,
    shared: SharedCounters,
}

impl<T, F> VuPool<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send,
{
    pub fn new(scenario: T) -> Self {
        Self {
            scenario,
            tasks: vec![],
            shared: SharedCounters::new(),
        }
    }

    /// Grows or shrinks the pool to `target` VUs. Surplus tasks are aborted;
    /// an aborted VU drops mid-iteration without recording an outcome.
    pub fn set_vus(&mut self, target: usize) {
        if self.tasks.len() == target {
        } else if self.tasks.len() > target {
            trace!("Scaling down to {target} VUs.");
            for handle in self.tasks.drain(target..) {
                handle.abort();
            }
        } else {
            trace!("Scaling up to {target} VUs.");
            while self.tasks.len() < target {
                let scenario = self.scenario.clone();
                let request_data = self.shared.clone_to_request_data();

                self.tasks.push(tokio::spawn(REQUEST_HOOK.scope(
                    request_data,
                    async move {
                        // NOTE: We have an outer loop just in case the
                        // user-provided scenario does not have a loop.
                        loop {
                            scenario().await;
                        }
                    },
                )));
            }
        }
    }

    pub fn vus(&self) -> usize {
        self.tasks.len()
    }

    /// Drains the counters accumulated since the previous collect into one
    /// tick sample.
    pub fn collect(&self, elapsed: Duration) -> (SampleData, Vec<Duration>) {
        self.shared.collect(elapsed)
    }

    pub fn checks(&self) -> Vec<CheckStats> {
        self.shared.checks.snapshot()
    }

    pub fn shutdown(mut self) {
        self.set_vus(0);
    }
}

struct SharedCounters {
    success: Arc<AtomicU64>,
    error: Arc<AtomicU64>,
    latency: Arc<AtomicBucket<Duration>>,
    checks: Arc<CheckRegistry>,
}

impl SharedCounters {
    fn new() -> Self {
        Self {
            success: Arc::new(AtomicU64::new(0)),
            error: Arc::new(AtomicU64::new(0)),
            latency: Arc::new(AtomicBucket::new()),
            checks: Arc::new(CheckRegistry::default()),
        }
    }

    fn clone_to_request_data(&self) -> RequestData {
        RequestData {
            success: self.success.clone(),
            error: self.error.clone(),
            latency: self.latency.clone(),
            checks: self.checks.clone(),
        }
    }

    fn collect(&self, elapsed: Duration) -> (SampleData, Vec<Duration>) {
        let success_count = self.success.swap(0, Ordering::Relaxed);
        let error_count = self.error.swap(0, Ordering::Relaxed);
        let mut latency = vec![];
        self.latency.clear_with(|dur| {
            latency.extend_from_slice(dur);
        });

        (
            SampleData {
                success_count,
                error_count,
                elapsed,
            },
            latency,
        )
    }
}
