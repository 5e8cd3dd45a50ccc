// crates/blockdrag-core/src/runtime/runner.rs
// ============================================================================
// Module: Reorder Run
// Description: State machine driving one verification attempt end to end.
// Purpose: Sequence fixtures, login, the drag loop, verification, teardown.
// Dependencies: crate::{core, interfaces, runtime}, rand, serde, tokio, tracing
// ============================================================================

//! ## Overview
//! One attempt walks `Idle -> FixturesCreated -> SessionAuthenticated ->
//! BlocksExpanded -> (Reordering <-> Verifying) x N -> TornDown`, or ends in
//! `Aborted`. The overall timeout wraps everything after fixture creation.
//! Teardown runs after the body whatever its outcome; a teardown failure
//! after a failed body is reported together with the body's fault.
//!
//! Gestures are issued back to back with a random pause in between and no
//! wait for persistence. That race between reorder and autosave is the
//! behavior under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::core::AdminUi;
use crate::core::Block;
use crate::core::Credentials;
use crate::core::NetworkProfile;
use crate::interfaces::BrowserSession;
use crate::interfaces::DocumentStore;
use crate::runtime::drag::DragDriver;
use crate::runtime::drag::DragPolicy;
use crate::runtime::drag::DragSettings;
use crate::runtime::error::HarnessError;
use crate::runtime::fixtures::FixtureBuilder;
use crate::runtime::fixtures::FixtureContext;
use crate::runtime::fixtures::FixturePlan;
use crate::runtime::session;
use crate::runtime::tracker::ExpectedOrder;
use crate::runtime::verify::Verifier;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Default number of drag iterations.
pub const DEFAULT_ITERATIONS: usize = 100;
/// Default verification cadence.
pub const DEFAULT_VERIFY_EVERY: usize = 10;
/// Default upper bound of the random pause between gestures.
pub const DEFAULT_JITTER_MAX: Duration = Duration::from_millis(500);
/// Default settle delay before a verification pass.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);
/// Default settle delay after expanding rows.
pub const DEFAULT_EXPAND_SETTLE: Duration = Duration::from_millis(500);
/// Default overall attempt ceiling.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(600);
/// Default ceiling for individual page waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Number of drag iterations.
    pub iterations: usize,
    /// Verify after iteration `i` when `i % verify_every == 0`.
    pub verify_every: usize,
    /// Upper bound of the uniform random pause after each gesture.
    pub jitter_max: Duration,
    /// Pause before each verification pass.
    pub settle: Duration,
    /// Pause after expanding rows.
    pub expand_settle: Duration,
    /// Gesture tuning.
    pub drag: DragSettings,
    /// Source row and candidate targets.
    pub policy: DragPolicy,
    /// Network conditions; `None` leaves the network untouched.
    pub network: Option<NetworkProfile>,
    /// Random seed; `None` draws and logs a fresh one.
    pub seed: Option<u64>,
    /// Ceiling for the whole attempt body.
    pub timeout: Duration,
    /// Ceiling for individual page waits.
    pub wait_timeout: Duration,
    /// Whole-attempt retries after a failure.
    pub retries: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            verify_every: DEFAULT_VERIFY_EVERY,
            jitter_max: DEFAULT_JITTER_MAX,
            settle: DEFAULT_SETTLE,
            expand_settle: DEFAULT_EXPAND_SETTLE,
            drag: DragSettings::default(),
            policy: DragPolicy::default(),
            network: Some(NetworkProfile::default()),
            seed: None,
            timeout: DEFAULT_RUN_TIMEOUT,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            retries: 0,
        }
    }
}

/// Where and as whom the admin UI is driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    /// Admin root URL, for example `http://localhost:3000/admin`.
    pub admin_url: String,
    /// Login credentials.
    pub credentials: Credentials,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Phases of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Nothing has happened yet.
    Idle,
    /// Fixture documents exist.
    FixturesCreated,
    /// Admin login completed.
    SessionAuthenticated,
    /// Every row is expanded and drag geometry is captured.
    BlocksExpanded,
    /// Drag gestures are being issued.
    Reordering,
    /// Rendered values are being compared.
    Verifying,
    /// Fixtures were deleted after a successful body.
    TornDown,
    /// The attempt failed.
    Aborted,
}

/// Summary of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Seed the random source was built from.
    pub seed: u64,
    /// Configured iteration count.
    pub iterations: usize,
    /// Drag gestures completed.
    pub drags: usize,
    /// Clean verification passes.
    pub verifications: usize,
    /// Phase transitions in order.
    pub phases: Vec<RunPhase>,
    /// Expected order as block names after the last completed drag.
    pub final_order: Vec<String>,
    /// Wall-clock duration of the attempt in milliseconds.
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Creates an empty report for an attempt.
    #[must_use]
    pub fn new(attempt: u32, seed: u64, iterations: usize) -> Self {
        Self {
            attempt,
            seed,
            iterations,
            drags: 0,
            verifications: 0,
            phases: vec![RunPhase::Idle],
            final_order: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Returns the most recent phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phases.last().copied().unwrap_or(RunPhase::Idle)
    }

    /// Records a phase transition; repeats of the current phase are dropped.
    pub fn enter(&mut self, phase: RunPhase) {
        if self.phase() != phase {
            if matches!(
                phase,
                RunPhase::FixturesCreated
                    | RunPhase::SessionAuthenticated
                    | RunPhase::BlocksExpanded
                    | RunPhase::TornDown
                    | RunPhase::Aborted
            ) {
                info!(attempt = self.attempt, ?phase, "run phase");
            }
            self.phases.push(phase);
        }
    }

    /// Snapshots the expected order as block names.
    fn record_order(&mut self, blocks: &[Block]) {
        self.final_order =
            blocks.iter().map(|block| block.name().unwrap_or_default().to_string()).collect();
    }
}

/// Failed attempt with everything recorded up to the failure.
#[derive(Debug, Error)]
#[error("attempt {} failed: {}", .report.attempt, .error)]
pub struct RunFailure {
    /// Progress up to the failure.
    pub report: RunReport,
    /// Fault that ended the attempt.
    #[source]
    pub error: HarnessError,
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// One reorder verification attempt.
pub struct ReorderRun<'a, S: ?Sized, B: ?Sized> {
    /// Fixture store.
    store: &'a S,
    /// Browsing session driving the admin UI.
    session: &'a B,
    /// Admin UI selectors.
    ui: AdminUi,
    /// Documents to create.
    plan: FixturePlan,
    /// Admin location and credentials.
    target: RunTarget,
    /// Tunables.
    settings: RunSettings,
}

impl<'a, S, B> ReorderRun<'a, S, B>
where
    S: DocumentStore + ?Sized,
    B: BrowserSession + ?Sized,
{
    /// Creates an attempt over the given collaborators.
    #[must_use]
    pub const fn new(
        store: &'a S,
        session: &'a B,
        ui: AdminUi,
        plan: FixturePlan,
        target: RunTarget,
        settings: RunSettings,
    ) -> Self {
        Self {
            store,
            session,
            ui,
            plan,
            target,
            settings,
        }
    }

    /// Runs one attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RunFailure`] carrying the fault and the partial report.
    pub async fn execute(&self, attempt: u32) -> Result<RunReport, RunFailure> {
        let started = Instant::now();
        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let mut report = RunReport::new(attempt, seed, self.settings.iterations);
        info!(attempt, seed, iterations = self.settings.iterations, "starting reorder run");

        let result = self.run(&mut report).await;
        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(()) => {
                report.enter(RunPhase::TornDown);
                info!(
                    attempt,
                    drags = report.drags,
                    verifications = report.verifications,
                    "reorder run passed"
                );
                Ok(report)
            }
            Err(error) => {
                report.enter(RunPhase::Aborted);
                warn!(attempt, kind = error.kind(), %error, "reorder run failed");
                Err(RunFailure {
                    report,
                    error,
                })
            }
        }
    }

    /// Creates fixtures, runs the timed body, and always tears down.
    async fn run(&self, report: &mut RunReport) -> Result<(), HarnessError> {
        self.validate()?;
        let context = FixtureBuilder::new(self.store).create(&self.plan).await?;
        report.enter(RunPhase::FixturesCreated);
        report.record_order(&context.tracked);

        let timeout = self.settings.timeout;
        let body = match tokio::time::timeout(timeout, self.body(&context, report)).await {
            Ok(result) => result,
            Err(_) => Err(HarnessError::Timeout(timeout)),
        };

        match (body, context.teardown(self.store).await) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(teardown)) => Err(HarnessError::Teardown(teardown)),
            (Err(primary), Ok(())) => Err(primary),
            (Err(primary), Err(teardown)) => Err(HarnessError::TeardownAfterFailure {
                primary: Box::new(primary),
                teardown,
            }),
        }
    }

    /// Rejects settings the loop cannot honor.
    fn validate(&self) -> Result<(), HarnessError> {
        if self.settings.verify_every == 0 {
            return Err(HarnessError::Fixture("verify cadence must be positive".to_string()));
        }
        let tracked = self.plan.tracked_len();
        if self.settings.policy.candidates.is_empty() {
            return Err(HarnessError::Fixture("drag policy has no candidates".to_string()));
        }
        if self.settings.policy.max_position() >= tracked {
            return Err(HarnessError::Fixture(format!(
                "drag policy reaches position {} but only {tracked} blocks are tracked",
                self.settings.policy.max_position()
            )));
        }
        Ok(())
    }

    /// Login, expansion, and the drag loop.
    async fn body(
        &self,
        context: &FixtureContext,
        report: &mut RunReport,
    ) -> Result<(), HarnessError> {
        let settings = &self.settings;
        let session = self.session;
        let mut rng = StdRng::seed_from_u64(report.seed);

        session::login(
            session,
            &self.ui,
            &self.target.admin_url,
            &self.target.credentials,
            settings.wait_timeout,
        )
        .await?;
        report.enter(RunPhase::SessionAuthenticated);

        session::open_document(
            session,
            &self.ui,
            &self.target.admin_url,
            context.fruit_id()?,
            settings.wait_timeout,
        )
        .await?;
        session::expand_all(session, &self.ui, settings.expand_settle).await?;
        let driver = DragDriver::capture(
            session,
            self.ui.clone(),
            settings.policy.clone(),
            settings.drag,
        )
        .await?;
        report.enter(RunPhase::BlocksExpanded);
        session::apply_network_profile(session, settings.network.as_ref()).await?;

        let mut tracker = ExpectedOrder::new(context.tracked.clone());
        let verifier = Verifier::new(self.ui.clone());
        let jitter_max_ms = u64::try_from(settings.jitter_max.as_millis()).unwrap_or(u64::MAX);

        for iteration in 0 .. settings.iterations {
            report.enter(RunPhase::Reordering);
            driver.drag_random(session, &mut tracker, &mut rng).await?;
            report.drags += 1;
            report.record_order(tracker.as_slice());

            let pause = rng.gen_range(0 ..= jitter_max_ms);
            tokio::time::sleep(Duration::from_millis(pause)).await;

            if iteration % settings.verify_every == 0 {
                report.enter(RunPhase::Verifying);
                tokio::time::sleep(settings.settle).await;
                verifier.verify(session, tracker.as_slice(), iteration).await?;
                report.verifications += 1;
                info!(iteration, order = ?report.final_order, "verification passed");
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Retries
// ============================================================================

/// Runs attempts until one passes or `retries` extra attempts have failed.
///
/// `attempt` receives the 1-based attempt number and must build every
/// collaborator it needs afresh.
///
/// # Errors
///
/// Returns the failure of the last attempt.
pub async fn run_with_retries<F, Fut>(retries: u32, mut attempt: F) -> Result<RunReport, RunFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<RunReport, RunFailure>>,
{
    let mut number = 1;
    loop {
        match attempt(number).await {
            Ok(report) => return Ok(report),
            Err(failure) if number <= retries => {
                warn!(attempt = number, remaining = retries + 1 - number, error = %failure.error, "retrying reorder run");
                number += 1;
            }
            Err(failure) => return Err(failure),
        }
    }
}
