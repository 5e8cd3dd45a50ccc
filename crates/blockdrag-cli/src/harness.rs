// crates/blockdrag-cli/src/harness.rs
// ============================================================================
// Module: Harness Wiring
// Description: Builds concrete collaborators from configuration and runs them.
// Purpose: Join the REST store, WebDriver session, and runner for the CLI.
// Dependencies: blockdrag-config, blockdrag-core, blockdrag-store-rest,
//               blockdrag-webdriver, tracing
// ============================================================================

//! ## Overview
//! The document store is built once per invocation. Every attempt opens a
//! fresh browser session, runs one [`ReorderRun`], closes the session, and
//! writes its artifacts. Artifact write failures are logged and never change
//! the attempt outcome.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use blockdrag_config::BlockdragConfig;
use blockdrag_config::StoreAuthMode;
use blockdrag_core::AdminUi;
use blockdrag_core::BrowserSession;
use blockdrag_core::Credentials;
use blockdrag_core::DocumentStore;
use blockdrag_core::HarnessError;
use blockdrag_core::ReorderRun;
use blockdrag_core::RunFailure;
use blockdrag_core::RunPhase;
use blockdrag_core::RunReport;
use blockdrag_core::StoreError;
use blockdrag_core::run_with_retries;
use blockdrag_store_rest::RestAuth;
use blockdrag_store_rest::RestDocumentStore;
use blockdrag_store_rest::RestStoreConfig;
use blockdrag_webdriver::Transcript;
use blockdrag_webdriver::WebDriverConfig;
use blockdrag_webdriver::WebDriverSession;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::artifacts::AttemptReporter;
use crate::artifacts::RunArtifacts;
use crate::artifacts::TRANSCRIPT_JSON;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Builds the REST store configuration.
#[must_use]
pub fn rest_store_config(config: &BlockdragConfig) -> RestStoreConfig {
    let store = &config.store;
    let auth = match store.auth {
        StoreAuthMode::None => RestAuth::None,
        StoreAuthMode::ApiKey => RestAuth::ApiKey {
            collection: store.api_key_collection.clone(),
            key: store.api_key.clone().unwrap_or_default(),
        },
        StoreAuthMode::Login => RestAuth::Login(Credentials {
            email: store.email.clone().unwrap_or_default(),
            password: store.password.clone().unwrap_or_default(),
        }),
    };
    RestStoreConfig {
        api_url: config.api_url(),
        auth,
        timeout: Duration::from_millis(store.timeout_ms),
        max_response_bytes: store.max_response_bytes,
    }
}

/// Builds the WebDriver session configuration.
#[must_use]
pub fn webdriver_config(config: &BlockdragConfig) -> WebDriverConfig {
    let browser = &config.browser;
    WebDriverConfig {
        url: browser.webdriver_url.clone(),
        headless: browser.headless,
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        timeout: Duration::from_millis(browser.timeout_ms),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that prevent any attempt from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Artifact root could not be created.
    #[error("artifact directory setup failed: {0}")]
    Artifacts(#[source] io::Error),
    /// Document store client could not be built.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Result of a full run with retries.
#[derive(Debug)]
pub struct RunOutcome {
    /// `run_{millis}` directory holding every attempt.
    pub artifacts_root: PathBuf,
    /// Report of the passing attempt, or the last failure.
    pub result: Result<RunReport, RunFailure>,
}

/// Runs the configured number of attempts against the REST store and a
/// WebDriver browser.
///
/// # Errors
///
/// Returns [`SetupError`] when the artifact root or the store client cannot
/// be created.
pub async fn execute(config: &BlockdragConfig) -> Result<RunOutcome, SetupError> {
    let artifacts = RunArtifacts::create(&config.artifacts.dir).map_err(SetupError::Artifacts)?;
    let store = RestDocumentStore::new(rest_store_config(config))?;
    info!(
        root = %artifacts.root().display(),
        retries = config.retries(),
        "starting blockdrag run"
    );
    let result = run_with_retries(config.retries(), |attempt| {
        run_attempt(&store, config, &artifacts, attempt)
    })
    .await;
    Ok(RunOutcome {
        artifacts_root: artifacts.root().to_path_buf(),
        result,
    })
}

/// Runs one attempt with a fresh browser session and records its artifacts.
///
/// # Errors
///
/// Returns [`RunFailure`] when the browser cannot be reached or the attempt
/// fails.
pub async fn run_attempt<S>(
    store: &S,
    config: &BlockdragConfig,
    artifacts: &RunArtifacts,
    attempt: u32,
) -> Result<RunReport, RunFailure>
where
    S: DocumentStore + ?Sized,
{
    let mut reporter = match artifacts.attempt(attempt) {
        Ok(dir) => Some(AttemptReporter::new(dir, attempt)),
        Err(err) => {
            warn!(attempt, error = %err, "attempt artifact directory unavailable");
            None
        }
    };
    let transcript = Transcript::new();
    let settings = config.run_settings();
    let mut notes = Vec::new();
    let outcome =
        match WebDriverSession::connect_with_transcript(&webdriver_config(config), transcript.clone())
            .await
        {
            Ok(session) => {
                let run = ReorderRun::new(
                    store,
                    &session,
                    AdminUi::default(),
                    config.fixture_plan(),
                    config.run_target(),
                    settings,
                );
                let outcome = run.execute(attempt).await;
                if let Err(err) = session.close().await {
                    warn!(attempt, error = %err, "webdriver session close failed");
                    notes.push(format!("session close failed: {err}"));
                }
                outcome
            }
            Err(err) => {
                let mut report =
                    RunReport::new(attempt, settings.seed.unwrap_or_default(), settings.iterations);
                report.enter(RunPhase::Aborted);
                notes.push("browser session never started".to_string());
                Err(RunFailure {
                    report,
                    error: HarnessError::Browser(err),
                })
            }
        };
    if let Some(reporter) = reporter.as_mut() {
        record_attempt(reporter, &transcript, &outcome, notes);
    }
    outcome
}

/// Writes the transcript, report, and summary of an attempt.
fn record_attempt(
    reporter: &mut AttemptReporter,
    transcript: &Transcript,
    outcome: &Result<RunReport, RunFailure>,
    notes: Vec<String>,
) {
    if let Err(err) = reporter.record_json(TRANSCRIPT_JSON, &transcript.entries()) {
        warn!(error = %err, "transcript artifact write failed");
    }
    match reporter.finish(outcome, notes) {
        Ok(summary) => info!(
            attempt = summary.attempt,
            status = summary.status.as_str(),
            dir = %reporter.artifacts().root().display(),
            "attempt artifacts written"
        ),
        Err(err) => warn!(error = %err, "attempt summary write failed"),
    }
}
