// system-tests/tests/suites/reorder.rs
// =============================================================================
// Module: Live Reorder Tests
// Description: Run fixtures, the browser session, and the full harness live.
// Purpose: Confirm the harness holds against a real admin UI.
// Dependencies: system-tests helpers, blockdrag-cli
// =============================================================================

use blockdrag_cli::artifacts::SUMMARY_JSON;
use blockdrag_cli::artifacts::TRANSCRIPT_JSON;
use blockdrag_cli::rest_store_config;
use blockdrag_cli::webdriver_config;
use blockdrag_core::BrowserSession;
use blockdrag_core::FixtureBuilder;
use blockdrag_core::RunPhase;
use blockdrag_store_rest::RestDocumentStore;
use blockdrag_webdriver::WebDriverSession;
use helpers::harness::LIVE_ITERATIONS;
use helpers::harness::LIVE_SEED;
use helpers::harness::live_config;
use helpers::harness::manual_attempt;
use helpers::readiness::wait_for_http_ready;
use serde_json::Value;
use system_tests::LiveTarget;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn fixtures_create_and_tear_down() -> Result<(), Box<dyn std::error::Error>> {
    let name = "fixtures_create_and_tear_down";
    let target = LiveTarget::from_env()?;
    let config = live_config(&target, name)?;
    let attempt = manual_attempt(name)?;
    wait_for_http_ready(&config.api_url(), target.ready_timeout).await?;

    let store = RestDocumentStore::new(rest_store_config(&config))?;
    let plan = config.fixture_plan();
    let context = FixtureBuilder::new(&store).create(&plan).await?;
    attempt.write_json("tracked_blocks.json", &context.tracked)?;
    let tracked = context.tracked.len();
    let has_parent = context.fruit.is_some();
    context.teardown(&store).await?;

    let expected = plan.tracked_len();
    if tracked != expected {
        return Err(format!("expected {expected} tracked blocks, got {tracked}").into());
    }
    if !has_parent {
        return Err("parent document missing after creation".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn browser_session_reaches_admin() -> Result<(), Box<dyn std::error::Error>> {
    let name = "browser_session_reaches_admin";
    let target = LiveTarget::from_env()?;
    let config = live_config(&target, name)?;
    let attempt = manual_attempt(name)?;
    wait_for_http_ready(&LiveTarget::webdriver_status_url(&config), target.ready_timeout).await?;
    wait_for_http_ready(&config.admin_url(), target.ready_timeout).await?;

    let session = WebDriverSession::connect(&webdriver_config(&config)).await?;
    let outcome = async {
        session.goto(&config.admin_url()).await?;
        session.current_url().await
    }
    .await;
    session.close().await?;
    attempt.write_json(TRANSCRIPT_JSON, &session.transcript().entries())?;
    let url = outcome?;
    if !url.starts_with(&config.target.base_url) {
        return Err(format!("browser left the CMS: {url}").into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reorder_run_keeps_fields_with_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let target = LiveTarget::from_env()?;
    let config = live_config(&target, "reorder_run_keeps_fields_with_blocks")?;
    wait_for_http_ready(&LiveTarget::webdriver_status_url(&config), target.ready_timeout).await?;
    wait_for_http_ready(&config.admin_url(), target.ready_timeout).await?;

    let outcome = blockdrag_cli::execute(&config).await?;
    let summary_path = outcome.artifacts_root.join("attempt_1").join(SUMMARY_JSON);
    let summary: Value = serde_json::from_slice(&std::fs::read(&summary_path)?)?;
    let report =
        outcome.result.map_err(|failure| format!("{failure} (see {})", summary_path.display()))?;

    if summary["status"] != "passed" {
        return Err(format!("summary recorded {}", summary["status"]).into());
    }
    if report.seed != LIVE_SEED {
        return Err(format!("seed drifted: {}", report.seed).into());
    }
    if report.drags != LIVE_ITERATIONS {
        return Err(format!("expected {LIVE_ITERATIONS} drags, got {}", report.drags).into());
    }
    if report.phase() != RunPhase::TornDown {
        return Err(format!("run ended in {}", serde_json::to_string(&report.phase())?).into());
    }
    Ok(())
}
