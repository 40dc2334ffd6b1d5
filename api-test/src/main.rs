//! Breaking-point test against the system under test: ramp up to 200
//! concurrent VUs issuing `GET {SUT_API_URL}/cpu` and fail the run on a >1%
//! error rate or a p99 above 2s.
use anyhow::anyhow;
use reqwest::{Client, StatusCode};
use stampede::prelude::*;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_SUT_API_URL: &str = "http://localhost:8080";

static CLIENT: OnceLock<Client> = OnceLock::new();
static BASE_URL: OnceLock<String> = OnceLock::new();

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter("api_test=info,stampede=info")
        .init();

    let report = api_scenario()
        .stage(Duration::from_secs(5), 5)
        .stage(Duration::from_secs(5), 100)
        .stage(Duration::from_secs(10), 200)
        .stage(Duration::from_secs(5), 0)
        .threshold(Threshold::error_rate_below(0.01))
        .threshold(Threshold::quantile_below(0.99, Duration::from_secs(2)).abort_on_fail())
        .await;

    info!("{report}");

    if !report.passed() {
        std::process::exit(1);
    }
}

#[scenario]
async fn api_scenario() {
    let _ = get_cpu().await;
}

#[request]
async fn get_cpu() -> anyhow::Result<()> {
    let client = CLIENT.get_or_init(Client::new);
    let res = client.get(cpu_url()).send().await?;
    let status = res.status();
    let body = res.text().await?;
    info!("{body}");

    if check("response code was 200", status == StatusCode::OK) {
        Ok(())
    } else {
        Err(anyhow!("response code was {status}"))
    }
}

fn cpu_url() -> String {
    format!("{}/cpu", base_url())
}

fn base_url() -> &'static str {
    BASE_URL.get_or_init(|| resolve_base_url(std::env::var("SUT_API_URL").ok()))
}

fn resolve_base_url(env: Option<String>) -> String {
    match env {
        Some(url) => {
            info!("SUT_API_URL is set to {url}");
            url
        }
        None => {
            info!("SUT_API_URL is not set, using default {DEFAULT_SUT_API_URL}");
            DEFAULT_SUT_API_URL.to_string()
        }
    }
}
