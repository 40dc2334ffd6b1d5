use crate::check::CheckRegistry;
use metrics_util::AtomicBucket;
use stampede_core::RequestLabels;
use std::time::{Duration, Instant};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Request hook used by the `#[request]` macro. Not intended to be used manually.
///
/// Times the wrapped future, records its latency, and counts the `Result` as
/// a success or an error. Transport failures and application-level failures
/// both travel the `Err` path, so the aggregated error rate does not
/// distinguish them.
pub async fn request_hook<T, R, E>(labels: RequestLabels, func: T) -> T::Output
where
    T: Future<Output = Result<R, E>>,
{
    if let Ok(hook) = REQUEST_HOOK.try_with(|v| v.clone()) {
        let start = Instant::now();
        let res = func.await;
        let elapsed = start.elapsed();

        hook.latency.push(elapsed);

        #[cfg(feature = "metrics")]
        {
            metrics::describe_histogram!(labels.latency, metrics::Unit::Nanoseconds, "");
            metrics::histogram!(labels.latency).record(elapsed.as_nanos() as f64);
        }

        if res.is_ok() {
            hook.success.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            metrics::counter!(labels.success).increment(1);
        } else {
            hook.error.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "metrics")]
            metrics::counter!(labels.error).increment(1);
        }

        res
    } else {
        tracing::error!("Request instrumented outside of a running scenario.");
        func.await
    }
}

#[derive(Clone)]
pub(crate) struct RequestData {
    pub success: Arc<AtomicU64>,
    pub error: Arc<AtomicU64>,
    pub latency: Arc<AtomicBucket<Duration>>,
    pub checks: Arc<CheckRegistry>,
}

tokio::task_local! {
    pub(crate) static REQUEST_HOOK: RequestData;
}
