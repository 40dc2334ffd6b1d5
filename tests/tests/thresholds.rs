mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use anyhow::anyhow;
    use reqwest::{Client, StatusCode};
    use stampede::prelude::*;
    use std::sync::OnceLock;
    use std::time::Duration;

    #[tokio::test]
    async fn failing_target_breaches_the_error_rate_threshold() {
        init().await;

        let report = failing_scenario()
            .stage(Duration::from_secs(2), 10)
            .threshold(Threshold::error_rate_below(0.01))
            .await;

        assert!(report.iterations > 0);
        assert_eq!(report.success_count, 0);
        assert_eq!(report.error_rate, 1.);
        assert!(!report.passed());
        assert!(!report.aborted);

        let check = &report.checks[0];
        assert_eq!(check.name, "response code was 200");
        assert_eq!(check.passes, 0);
        assert!(check.fails > 0);
    }

    #[tokio::test]
    async fn slow_target_aborts_on_the_latency_threshold() {
        init().await;

        let report = crawling_scenario()
            .stage(Duration::from_secs(30), 10)
            .threshold(
                Threshold::quantile_below(0.99, Duration::from_millis(100)).abort_on_fail(),
            )
            .await;

        assert!(report.aborted);
        assert!(!report.passed());
        assert!(report.elapsed < Duration::from_secs(30));
        assert!(report.latency_p99 >= Duration::from_millis(100));
    }

    /* Scenario Helpers */

    static CLIENT: OnceLock<Client> = OnceLock::new();

    #[scenario]
    async fn failing_scenario() {
        let _ = get_cpu_500().await;
    }

    #[request]
    async fn get_cpu_500() -> anyhow::Result<()> {
        let client = CLIENT.get_or_init(Client::new);
        let res = client
            .get(format!("{MOCK_BASE_URL}/cpu/status/500"))
            .send()
            .await?;

        let status = res.status();
        if check("response code was 200", status == StatusCode::OK) {
            Ok(())
        } else {
            Err(anyhow!("response code was {status}"))
        }
    }

    #[scenario]
    async fn crawling_scenario() {
        let _ = get_cpu_crawling().await;
    }

    #[request]
    async fn get_cpu_crawling() -> anyhow::Result<()> {
        let client = CLIENT.get_or_init(Client::new);
        client
            .get(format!("{MOCK_BASE_URL}/cpu/delay/ms/400"))
            .send()
            .await?;
        Ok(())
    }
}
