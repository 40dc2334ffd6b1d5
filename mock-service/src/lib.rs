use axum::{debug_handler, extract::Path, http::StatusCode, routing::get, Router};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tracing::debug;

pub async fn run(addr: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, router()).await.unwrap();
}

pub fn router() -> Router {
    Router::new()
        .route("/cpu", get(cpu))
        .route("/cpu/delay/ms/:delay_ms", get(cpu_delay))
        .route("/cpu/status/:code", get(cpu_status))
        .route("/cpu/limited/:max_tps", get(cpu_limited))
}

/// The endpoint the scenario under test hits: answers immediately.
#[debug_handler]
pub async fn cpu() -> &'static str {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    "42"
}

#[debug_handler]
pub async fn cpu_delay(Path(delay_ms): Path<u64>) -> &'static str {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    "42"
}

/// Answers with the requested status code, for exercising non-200 paths.
#[debug_handler]
pub async fn cpu_status(Path(code): Path<u16>) -> Result<&'static str, StatusCode> {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    match StatusCode::from_u16(code) {
        Ok(status) if status.is_success() => Ok("42"),
        Ok(status) => Err(status),
        Err(_) => Err(StatusCode::BAD_REQUEST),
    }
}

lazy_static! {
    static ref LIMITED_MAP: Arc<RwLock<HashMap<u32, Arc<DefaultDirectRateLimiter>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Overloadable endpoint: 500s once the requested rate limit is exceeded.
#[debug_handler]
pub async fn cpu_limited(Path(max_tps): Path<u32>) -> Result<&'static str, StatusCode> {
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);

    let read = LIMITED_MAP.read().unwrap().get(&max_tps).cloned();
    let limiter = if let Some(limiter) = read {
        limiter
    } else {
        let limiter = Arc::new(rate_limiter(max_tps));
        LIMITED_MAP
            .write()
            .unwrap()
            .insert(max_tps, limiter.clone());
        limiter
    };

    match limiter.check() {
        Ok(_) => Ok("42"),
        Err(_) => {
            debug!("MOCK SERVER ___ over limit");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/** Utils **/

pub fn rate_limiter(tps: u32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(NonZeroU32::new(tps).unwrap()))
}

/** TPS Printer **/

static TPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn tps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let transactions = TPS_MEASURE.fetch_min(0, Ordering::Relaxed);
        println!("{transactions} TPS");
    }
}
