// system-tests/src/lib.rs
// ============================================================================
// Module: blockdrag System Tests Library
// Description: Locates the CMS and WebDriver a live run talks to.
// Purpose: Share live target settings across system-test binaries.
// Dependencies: blockdrag-config
// ============================================================================

//! ## Overview
//! The live binaries in `system-tests/tests` drive a real CMS through a real
//! WebDriver endpoint and only build with the `system-tests` feature. This
//! library holds the one piece they share outside the harness itself: where
//! those two services live and how long to wait for them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod live;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use live::LiveTarget;
