// crates/blockdrag-cli/src/lib.rs
// ============================================================================
// Module: blockdrag CLI Library
// Description: Run wiring and artifact output for the blockdrag binary.
// Purpose: Keep the binary thin and the wiring testable.
// Dependencies: blockdrag-config, blockdrag-core, blockdrag-store-rest,
//               blockdrag-webdriver
// ============================================================================

//! ## Overview
//! `blockdrag` drives a headless browser through the CMS admin UI, reorders
//! nested blocks by dragging, and checks that every rendered field stays with
//! its block. This library holds the pieces the binary composes.

pub mod artifacts;
pub mod harness;

pub use artifacts::AttemptArtifacts;
pub use artifacts::AttemptReporter;
pub use artifacts::AttemptStatus;
pub use artifacts::AttemptSummary;
pub use artifacts::RunArtifacts;
pub use harness::RunOutcome;
pub use harness::SetupError;
pub use harness::execute;
pub use harness::rest_store_config;
pub use harness::run_attempt;
pub use harness::webdriver_config;
