// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Polls the CMS and the WebDriver endpoint until they answer.
// Purpose: Ensure services are ready without arbitrary sleeps.
// Dependencies: reqwest, tokio
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use tokio::time::sleep;

/// Polls `url` until it answers with a non-5xx status or `timeout` expires.
pub async fn wait_for_http_ready(url: &str, timeout: Duration) -> Result<(), String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|err| format!("readiness client build failed: {err}"))?;
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let last = match client.get(url).send().await {
            Ok(response) if !response.status().is_server_error() => return Ok(()),
            Ok(response) => format!("status {}", response.status()),
            Err(err) => err.to_string(),
        };
        if start.elapsed() > timeout {
            return Err(format!("{url} not ready after {attempts} attempts: {last}"));
        }
        sleep(Duration::from_millis(250)).await;
    }
}
