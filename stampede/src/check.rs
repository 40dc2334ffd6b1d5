//! Named boolean assertions, evaluated once per iteration and aggregated
//! across the run.
use crate::request::REQUEST_HOOK;
use stampede_core::CheckStats;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Record one pass/fail observation under `name`.
///
/// Returns `passed` unchanged so the outcome can feed into the surrounding
/// request's `Result`. The check itself never fails the iteration. Outside a
/// running scenario the observation is dropped.
///
/// # Example
/// ```no_run
/// use stampede::prelude::*;
///
/// # fn status() -> u16 { 200 }
/// let ok = check("response code was 200", status() == 200);
/// ```
pub fn check(name: &'static str, passed: bool) -> bool {
    if let Ok(checks) = REQUEST_HOOK.try_with(|v| v.checks.clone()) {
        checks.record(name, passed);
    } else {
        tracing::error!("Check {name:?} recorded outside of a running scenario.");
    }
    passed
}

/// Per-name pass/fail counters shared across every VU of a run.
#[derive(Default)]
pub(crate) struct CheckRegistry {
    counters: RwLock<HashMap<&'static str, CheckCounter>>,
}

#[derive(Default)]
struct CheckCounter {
    passes: AtomicU64,
    fails: AtomicU64,
}

impl CheckCounter {
    fn record(&self, passed: bool) {
        if passed {
            self.passes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.fails.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl CheckRegistry {
    pub fn record(&self, name: &'static str, passed: bool) {
        {
            let read = self.counters.read().unwrap();
            if let Some(counter) = read.get(name) {
                counter.record(passed);
                return;
            }
        }

        let mut write = self.counters.write().unwrap();
        write.entry(name).or_default().record(passed);
    }

    pub fn snapshot(&self) -> Vec<CheckStats> {
        let read = self.counters.read().unwrap();
        let mut stats: Vec<_> = read
            .iter()
            .map(|(name, counter)| CheckStats {
                name,
                passes: counter.passes.load(Ordering::Relaxed),
                fails: counter.fails.load(Ordering::Relaxed),
            })
            .collect();
        stats.sort_by_key(|s| s.name);
        stats
    }
}
