// crates/blockdrag-store-rest/src/lib.rs
// ============================================================================
// Module: REST Document Store
// Description: DocumentStore backend speaking the CMS REST API.
// Purpose: Create and tear down harness fixtures on a live CMS.
// Dependencies: blockdrag-core, reqwest
// ============================================================================

//! ## Overview
//! This crate provides [`RestDocumentStore`], the [`blockdrag_core::DocumentStore`]
//! used against a running CMS. It supports anonymous, API key, and login
//! authentication, and enforces response size limits on every read.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_MAX_RESPONSE_BYTES;
pub use store::DEFAULT_TIMEOUT;
pub use store::RestAuth;
pub use store::RestDocumentStore;
pub use store::RestStoreConfig;
