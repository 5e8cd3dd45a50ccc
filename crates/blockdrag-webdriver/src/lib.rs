// crates/blockdrag-webdriver/src/lib.rs
// ============================================================================
// Module: blockdrag WebDriver
// Description: BrowserSession backend speaking W3C WebDriver.
// Purpose: Drive a Chromium browser for live harness runs.
// Dependencies: blockdrag-core, reqwest
// ============================================================================

//! ## Overview
//! This crate provides [`WebDriverSession`], the
//! [`blockdrag_core::BrowserSession`] used against a running WebDriver
//! server, plus the [`Transcript`] of every command it issued.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod session;
pub mod transcript;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use session::DEFAULT_TIMEOUT;
pub use session::ELEMENT_KEY;
pub use session::WebDriverConfig;
pub use session::WebDriverSession;
pub use transcript::Transcript;
pub use transcript::TranscriptEntry;
