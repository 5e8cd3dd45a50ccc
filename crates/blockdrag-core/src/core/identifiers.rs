// crates/blockdrag-core/src/core/identifiers.rs
// ============================================================================
// Module: blockdrag Identifiers
// Description: Document identifiers and collection slugs.
// Purpose: Give stable, typed names to CMS records and collections.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Document stores hand out identifiers either as strings (document
//! databases) or as integers (relational databases). [`DocId`] accepts both
//! shapes on the wire and always displays as text so selectors and query
//! filters can embed it directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Document Identifier
// ============================================================================

/// Identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    /// Numeric identifier.
    Number(u64),
    /// Textual identifier.
    Text(String),
}

impl DocId {
    /// Creates a textual identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => value.fmt(f),
            Self::Text(value) => value.fmt(f),
        }
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for DocId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Collections the harness reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Admin users.
    Users,
    /// Parent documents holding the block sequence.
    Fruits,
    /// Referenced seed records.
    Seeds,
}

impl Collection {
    /// Returns the collection slug used in API paths.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Fruits => "fruits",
            Self::Seeds => "seeds",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
