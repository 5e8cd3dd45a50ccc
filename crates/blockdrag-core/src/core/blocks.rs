// crates/blockdrag-core/src/core/blocks.rs
// ============================================================================
// Module: blockdrag Block Model
// Description: Polymorphic block sub-documents and the seeds they reference.
// Purpose: Mirror the CMS block shapes with per-variant visibility rules.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Block`] is a closed, tagged union keyed on `blockType`. Each variant
//! owns its field set and decides conditional visibility from its own sibling
//! data only, the same way the admin UI evaluates field conditions.
//!
//! The pear variant's conditional field is gated on the sibling key
//! `showConditionalApple`, not on its own `showConditionalPear` toggle. That
//! is how the upstream collection is configured and it is kept verbatim:
//! unknown sibling keys are retained on [`PearBlock`] so the gate can still be
//! evaluated when a stored block happens to carry that key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::DocId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sibling key that gates the pear conditional field.
pub const PEAR_CONDITION_GATE: &str = "showConditionalApple";

// ============================================================================
// SECTION: Seeds
// ============================================================================

/// Seed record referenced by blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Seed identifier.
    pub id: DocId,
    /// Display name used as the relationship label.
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference from a block to a seed.
///
/// # Invariants
/// - Always serializes as the bare identifier so create payloads carry ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SeedRef {
    /// Populated seed document.
    Populated(Seed),
    /// Unpopulated identifier.
    Id(DocId),
}

impl SeedRef {
    /// Returns the referenced seed identifier.
    #[must_use]
    pub const fn id(&self) -> &DocId {
        match self {
            Self::Populated(seed) => &seed.id,
            Self::Id(id) => id,
        }
    }

    /// Returns the seed name when the reference is populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(seed) => seed.name.as_deref(),
            Self::Id(_) => None,
        }
    }
}

impl From<Seed> for SeedRef {
    fn from(seed: Seed) -> Self {
        Self::Populated(seed)
    }
}

impl Serialize for SeedRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id().serialize(serializer)
    }
}

// ============================================================================
// SECTION: Variants
// ============================================================================

/// Grouped conditional fields of the apple variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleConditionalFields {
    /// Conditional text field.
    #[serde(
        rename = "ConditionalFieldApple",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conditional_field_apple: Option<String>,
}

/// Apple block: text, toggle, grouped conditional field, seed references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppleBlock {
    /// Block row identifier assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Row label.
    #[serde(rename = "blockName", default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    /// Apple kind text field.
    #[serde(rename = "AppleKind", default, skip_serializing_if = "Option::is_none")]
    pub apple_kind: Option<String>,
    /// Toggle gating the conditional group.
    #[serde(rename = "showConditionalApple", default, skip_serializing_if = "Option::is_none")]
    pub show_conditional_apple: Option<bool>,
    /// Conditional group, rendered only when the toggle is on.
    #[serde(rename = "conditionalFields", default, skip_serializing_if = "Option::is_none")]
    pub conditional_fields: Option<AppleConditionalFields>,
    /// Seed references in display order.
    #[serde(rename = "seedApple", default, deserialize_with = "null_as_empty")]
    pub seed_apple: Vec<SeedRef>,
}

impl AppleBlock {
    /// Returns true when the conditional group is rendered.
    #[must_use]
    pub fn conditional_visible(&self) -> bool {
        self.show_conditional_apple == Some(true)
    }
}

/// Pear block: text, toggle, direct conditional field, seed references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PearBlock {
    /// Block row identifier assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Row label.
    #[serde(rename = "blockName", default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    /// Pear type text field.
    #[serde(rename = "PearType", default, skip_serializing_if = "Option::is_none")]
    pub pear_type: Option<String>,
    /// Pear toggle (does not gate the conditional field).
    #[serde(rename = "showConditionalPear", default, skip_serializing_if = "Option::is_none")]
    pub show_conditional_pear: Option<bool>,
    /// Conditional text field gated by [`PEAR_CONDITION_GATE`].
    #[serde(rename = "ConditionalFieldPear", default, skip_serializing_if = "Option::is_none")]
    pub conditional_field_pear: Option<String>,
    /// Seed references in display order.
    #[serde(rename = "seedPear", default, deserialize_with = "null_as_empty")]
    pub seed_pear: Vec<SeedRef>,
    /// Remaining sibling data, kept for condition evaluation.
    #[serde(flatten)]
    pub siblings: Map<String, Value>,
}

impl PearBlock {
    /// Returns true when the conditional field is rendered.
    #[must_use]
    pub fn conditional_visible(&self) -> bool {
        matches!(self.siblings.get(PEAR_CONDITION_GATE), Some(Value::Bool(true)))
    }
}

// ============================================================================
// SECTION: Block Union
// ============================================================================

/// Variant discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockVariant {
    /// `apples` blocks.
    Apple,
    /// `pears` blocks.
    Pear,
}

impl BlockVariant {
    /// Returns the `blockType` tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "apples",
            Self::Pear => "pears",
        }
    }
}

/// Text field of a block as rendered in the admin UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField<'a> {
    /// Field path relative to the block row.
    pub path: &'static str,
    /// Stored value, absent when unset.
    pub value: Option<&'a str>,
}

/// Block sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType")]
pub enum Block {
    /// Apple variant.
    #[serde(rename = "apples")]
    Apple(AppleBlock),
    /// Pear variant.
    #[serde(rename = "pears")]
    Pear(PearBlock),
}

impl Block {
    /// Returns the variant discriminator.
    #[must_use]
    pub const fn variant(&self) -> BlockVariant {
        match self {
            Self::Apple(_) => BlockVariant::Apple,
            Self::Pear(_) => BlockVariant::Pear,
        }
    }

    /// Returns the block row identifier when assigned.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Apple(block) => block.id.as_deref(),
            Self::Pear(block) => block.id.as_deref(),
        }
    }

    /// Returns the row label.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Apple(block) => block.block_name.as_deref(),
            Self::Pear(block) => block.block_name.as_deref(),
        }
    }

    /// Returns the name of the relationship field holding seeds.
    #[must_use]
    pub const fn seed_field(&self) -> &'static str {
        match self {
            Self::Apple(_) => "seedApple",
            Self::Pear(_) => "seedPear",
        }
    }

    /// Returns seed references in display order.
    #[must_use]
    pub fn seeds(&self) -> &[SeedRef] {
        match self {
            Self::Apple(block) => &block.seed_apple,
            Self::Pear(block) => &block.seed_pear,
        }
    }

    /// Replaces the seed references.
    pub fn set_seeds(&mut self, seeds: Vec<SeedRef>) {
        match self {
            Self::Apple(block) => block.seed_apple = seeds,
            Self::Pear(block) => block.seed_pear = seeds,
        }
    }

    /// Returns the text fields the admin UI renders for this block.
    ///
    /// Conditional fields are listed only when their gate is on.
    #[must_use]
    pub fn visible_text_fields(&self) -> Vec<TextField<'_>> {
        match self {
            Self::Apple(block) => {
                let mut fields = vec![TextField {
                    path: "AppleKind",
                    value: block.apple_kind.as_deref(),
                }];
                if block.conditional_visible() {
                    fields.push(TextField {
                        path: "conditionalFields.ConditionalFieldApple",
                        value: block
                            .conditional_fields
                            .as_ref()
                            .and_then(|group| group.conditional_field_apple.as_deref()),
                    });
                }
                fields
            }
            Self::Pear(block) => {
                let mut fields = vec![TextField {
                    path: "PearType",
                    value: block.pear_type.as_deref(),
                }];
                if block.conditional_visible() {
                    fields.push(TextField {
                        path: "ConditionalFieldPear",
                        value: block.conditional_field_pear.as_deref(),
                    });
                }
                fields
            }
        }
    }

    /// Replaces every seed reference with the populated record from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns the first identifier missing from `lookup`.
    pub fn resolve_seeds(&mut self, lookup: &BTreeMap<DocId, Seed>) -> Result<(), DocId> {
        let refs = match self {
            Self::Apple(block) => &mut block.seed_apple,
            Self::Pear(block) => &mut block.seed_pear,
        };
        for seed_ref in refs.iter_mut() {
            let id = seed_ref.id().clone();
            let seed = lookup.get(&id).cloned().ok_or(id)?;
            *seed_ref = SeedRef::Populated(seed);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Treats an explicit `null` relationship as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SeedRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SeedRef>>::deserialize(deserializer)?.unwrap_or_default())
}
