// crates/blockdrag-core/src/runtime/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for a reorder verification run.
// Purpose: Keep geometry, assertion, and timeout faults distinguishable.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Geometry faults mean the harness's model of the page is wrong and abort
//! the run. Assertion faults are the defect the harness exists to catch.
//! Timeout faults come from the overall run ceiling. Teardown failures are
//! reported as ordinary failures, alongside any earlier fault.

use std::time::Duration;

use thiserror::Error;

use crate::core::DocId;
use crate::core::Selector;
use crate::interfaces::BrowserError;
use crate::interfaces::StoreError;
use crate::runtime::tracker::TrackerError;
use crate::runtime::verify::VerificationReport;

/// Errors raised while executing a run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Document store failure outside teardown.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Browser session failure.
    #[error(transparent)]
    Browser(#[from] BrowserError),
    /// Expected element is missing or lies off screen.
    #[error("geometry fault at {selector}: {context}")]
    Geometry {
        /// Element that could not be resolved.
        selector: Selector,
        /// What the harness was doing.
        context: String,
    },
    /// Rendered values diverged from the expected order.
    #[error("assertion fault at iteration {iteration}: {report}")]
    Assertion {
        /// Loop iteration that ran the verification.
        iteration: usize,
        /// Every mismatch found in the pass.
        report: VerificationReport,
    },
    /// Login did not reach the dashboard.
    #[error("session fault: {0}")]
    Session(String),
    /// Fixture data was inconsistent.
    #[error("fixture fault: {0}")]
    Fixture(String),
    /// Created block references a seed the fixture did not create.
    #[error("fixture fault: block references unknown seed {0}")]
    UnknownSeed(DocId),
    /// Overall run ceiling expired.
    #[error("run exceeded timeout of {}ms", .0.as_millis())]
    Timeout(Duration),
    /// Tracker rejected a reorder.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// Teardown failed after a successful body.
    #[error("teardown failed: {0}")]
    Teardown(StoreError),
    /// Teardown failed after the body had already failed.
    #[error("{primary}; teardown also failed: {teardown}")]
    TeardownAfterFailure {
        /// Fault raised by the run body.
        primary: Box<HarnessError>,
        /// Teardown failure.
        teardown: StoreError,
    },
}

impl HarnessError {
    /// Returns a stable label for run summaries.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Browser(_) => "browser",
            Self::Geometry {
                ..
            } => "geometry",
            Self::Assertion {
                ..
            } => "assertion",
            Self::Session(_) => "session",
            Self::Fixture(_) | Self::UnknownSeed(_) => "fixture",
            Self::Timeout(_) => "timeout",
            Self::Tracker(_) => "tracker",
            Self::Teardown(_) => "teardown",
            Self::TeardownAfterFailure {
                primary, ..
            } => primary.kind(),
        }
    }
}
