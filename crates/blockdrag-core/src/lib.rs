// crates/blockdrag-core/src/lib.rs
// ============================================================================
// Module: blockdrag Core Library
// Description: Randomized drag-and-drop verification of block reordering.
// Purpose: Detect field values that follow the wrong block after a reorder.
// Dependencies: async-trait, rand, serde, serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! blockdrag drives an admin UI through repeated reorder gestures while the
//! UI autosaves, and checks that every rendered block still shows its own
//! field values and relationship labels. The crate holds the block model,
//! the [`DocumentStore`] and [`BrowserSession`] seams, and the runtime that
//! sequences one attempt.
//! Invariants:
//! - The expected-order tracker is only mutated by the drag driver.
//! - Conditional fields are compared only when their gate is on.
//! - Fixtures are torn down after every attempt that created them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use crate::interfaces::BoundingBox;
pub use crate::interfaces::BrowserError;
pub use crate::interfaces::BrowserSession;
pub use crate::interfaces::DocumentStore;
pub use crate::interfaces::Point;
pub use crate::interfaces::StoreError;
pub use crate::runtime::*;
