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
    async fn healthy_target_yields_zero_error_rate() {
        init().await;

        let report = healthy_scenario()
            .stage(Duration::from_secs(1), 5)
            .stage(Duration::from_secs(2), 20)
            .stage(Duration::from_secs(1), 0)
            .threshold(Threshold::error_rate_below(0.01))
            .await;

        assert!(report.iterations > 0);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.error_rate, 0.);
        assert!(report.passed());

        // Both the status check and the body check must have seen only passes.
        assert_eq!(report.checks.len(), 2);
        assert!(report.checks.iter().all(|c| c.passes > 0 && c.fails == 0));
    }

    #[tokio::test]
    async fn slow_target_still_completes_without_abort_threshold() {
        init().await;

        let report = delayed_scenario()
            .stage(Duration::from_secs(2), 10)
            .await;

        assert!(report.iterations > 0);
        assert!(!report.aborted);
        assert!(report.latency_p50 >= Duration::from_millis(20));
    }

    /* Scenario Helpers */

    static CLIENT: OnceLock<Client> = OnceLock::new();

    #[scenario]
    async fn healthy_scenario() {
        let _ = get_cpu().await;
    }

    #[request]
    async fn get_cpu() -> anyhow::Result<()> {
        let client = CLIENT.get_or_init(Client::new);
        let res = client.get(format!("{MOCK_BASE_URL}/cpu")).send().await?;
        let status = res.status();
        let body = res.text().await?;

        let status_ok = check("response code was 200", status == StatusCode::OK);
        let body_ok = check("body is 42", body == "42");
        if status_ok && body_ok {
            Ok(())
        } else {
            Err(anyhow!("response code was {status}, body {body:?}"))
        }
    }

    #[scenario]
    async fn delayed_scenario() {
        let _ = get_cpu_delayed().await;
    }

    #[request]
    async fn get_cpu_delayed() -> anyhow::Result<()> {
        let client = CLIENT.get_or_init(Client::new);
        client
            .get(format!("{MOCK_BASE_URL}/cpu/delay/ms/25"))
            .send()
            .await?;
        Ok(())
    }
}
