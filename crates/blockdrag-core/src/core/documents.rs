// crates/blockdrag-core/src/core/documents.rs
// ============================================================================
// Module: blockdrag Documents
// Description: Parent documents and users created as fixtures.
// Purpose: Typed views of the records returned by the document store.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::blocks::Block;
use crate::core::identifiers::DocId;

/// Parent document holding the ordered block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fruit {
    /// Document identifier.
    pub id: DocId,
    /// Blocks in stored order.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Admin user used to sign in to the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Document identifier.
    pub id: DocId,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Login credentials for the admin UI.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
