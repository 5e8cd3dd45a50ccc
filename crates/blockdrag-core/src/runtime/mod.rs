// crates/blockdrag-core/src/runtime/mod.rs
// ============================================================================
// Module: blockdrag Runtime
// Description: Drag driver, verifier, fixtures, and the run state machine.
// Purpose: Execute reorder verification attempts against injected backends.
// Dependencies: crate::{core, interfaces}, rand, tokio, tracing
// ============================================================================

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod drag;
pub mod error;
pub mod fixtures;
pub mod memory_store;
pub mod runner;
pub mod session;
pub mod tracker;
pub mod verify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use drag::DragDriver;
pub use drag::DragGeometry;
pub use drag::DragOutcome;
pub use drag::DragPolicy;
pub use drag::DragSettings;
pub use drag::DropPlacement;
pub use drag::drop_point;
pub use error::HarnessError;
pub use fixtures::BlockPlan;
pub use fixtures::FixtureBuilder;
pub use fixtures::FixtureContext;
pub use fixtures::FixturePlan;
pub use memory_store::InMemoryDocumentStore;
pub use runner::ReorderRun;
pub use runner::RunFailure;
pub use runner::RunPhase;
pub use runner::RunReport;
pub use runner::RunSettings;
pub use runner::RunTarget;
pub use runner::run_with_retries;
pub use tracker::ExpectedOrder;
pub use tracker::TrackerError;
pub use verify::Mismatch;
pub use verify::VerificationReport;
pub use verify::Verifier;
