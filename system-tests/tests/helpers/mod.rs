// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: Live Suite Helpers
// Description: Configuration and readiness helpers for live suites.
// Purpose: Build pinned harness configs and wait for services to answer.
// Dependencies: system-tests, blockdrag-cli, blockdrag-config, reqwest
// ============================================================================

//! ## Overview
//! Every live test loads its [`system_tests::LiveTarget`], waits for the
//! services it needs, and writes its artifacts below
//! `target/system-tests/<test name>` through the CLI's artifact layout.

#![allow(dead_code, reason = "Each suite uses a different subset of the helpers.")]

pub mod harness;
pub mod readiness;
