// crates/blockdrag-core/src/core/mod.rs
// ============================================================================
// Module: blockdrag Core Types
// Description: Data model shared by the harness runtime and its transports.
// Purpose: Group identifiers, documents, blocks, selectors, and profiles.
// Dependencies: serde, serde_json
// ============================================================================

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admin_ui;
pub mod blocks;
pub mod documents;
pub mod identifiers;
pub mod network;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin_ui::AdminUi;
pub use admin_ui::Selector;
pub use blocks::AppleBlock;
pub use blocks::AppleConditionalFields;
pub use blocks::Block;
pub use blocks::BlockVariant;
pub use blocks::PEAR_CONDITION_GATE;
pub use blocks::PearBlock;
pub use blocks::Seed;
pub use blocks::SeedRef;
pub use blocks::TextField;
pub use documents::Credentials;
pub use documents::Fruit;
pub use documents::User;
pub use identifiers::Collection;
pub use identifiers::DocId;
pub use network::NetworkProfile;
pub use network::kbps_to_bytes_per_sec;
