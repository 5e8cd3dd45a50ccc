// crates/blockdrag-config/src/lib.rs
// ============================================================================
// Module: blockdrag Config Library
// Description: Harness config model, validation, and example generation.
// Purpose: Single source of truth for blockdrag.toml semantics.
// Dependencies: blockdrag-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `blockdrag-config` defines the configuration model for the drag-and-drop
//! harness. It validates fail-closed, layers environment overrides on top of
//! the file, and converts the result into runtime settings for
//! `blockdrag-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod examples;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::ConfigEnv;
pub use env::EnvOverrides;
pub use env::read_env_strict;
pub use examples::config_toml_example;
