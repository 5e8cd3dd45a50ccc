// crates/blockdrag-core/src/runtime/verify.rs
// ============================================================================
// Module: Block Verifier
// Description: Compares rendered block fields with the expected order.
// Purpose: Detect field values attributed to the wrong block after reorders.
// Dependencies: crate::{core, interfaces}, serde, tracing
// ============================================================================

//! ## Overview
//! For every position of the expected sequence the verifier reads the text
//! inputs the block's variant renders and the relationship labels of its seed
//! field, then compares them with exact string equality. Absent expected
//! values compare as the empty string. Conditional fields are only read when
//! their gate is on; a hidden field is never a mismatch. Label sequences are
//! compared in display order, including their length.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::core::AdminUi;
use crate::core::Block;
use crate::core::BlockVariant;
use crate::interfaces::BrowserSession;
use crate::runtime::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder for values the page did not render.
pub const MISSING_VALUE: &str = "<missing>";

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// One rendered value that diverged from the expected block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Block position in display order.
    pub position: usize,
    /// Variant expected at the position.
    pub variant: BlockVariant,
    /// Label of the expected block, when it has one.
    pub block_name: Option<String>,
    /// Field path, with `[n]` for relationship labels.
    pub field: String,
    /// Expected rendered value.
    pub expected: String,
    /// Rendered value, or [`MISSING_VALUE`].
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {} ({}", self.position, self.variant.as_str())?;
        if let Some(name) = &self.block_name {
            write!(f, " \"{name}\"")?;
        }
        write!(f, ") field {}: expected \"{}\", actual \"{}\"", self.field, self.expected, self.actual)
    }
}

/// Outcome of one verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Number of block positions inspected.
    pub positions_checked: usize,
    /// Every mismatch found, in position order.
    pub mismatches: Vec<Mismatch>,
}

impl VerificationReport {
    /// Returns true when every rendered value matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch(es) across {} position(s)",
            self.mismatches.len(),
            self.positions_checked
        )?;
        for mismatch in &self.mismatches {
            write!(f, "; {mismatch}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Reads rendered block values and compares them with expectations.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    /// Admin UI selectors.
    ui: AdminUi,
}

impl Verifier {
    /// Creates a verifier for the given admin UI contract.
    #[must_use]
    pub const fn new(ui: AdminUi) -> Self {
        Self {
            ui,
        }
    }

    /// Inspects every expected position and collects mismatches.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Browser`] when the page cannot be read.
    pub async fn inspect<B>(
        &self,
        session: &B,
        expected: &[Block],
    ) -> Result<VerificationReport, HarnessError>
    where
        B: BrowserSession + ?Sized,
    {
        let mut report = VerificationReport {
            positions_checked: expected.len(),
            mismatches: Vec::new(),
        };
        for (position, block) in expected.iter().enumerate() {
            self.inspect_block(session, position, block, &mut report.mismatches).await?;
        }
        Ok(report)
    }

    /// Inspects every position and fails on any mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Assertion`] carrying the full report when any
    /// rendered value diverges.
    pub async fn verify<B>(
        &self,
        session: &B,
        expected: &[Block],
        iteration: usize,
    ) -> Result<VerificationReport, HarnessError>
    where
        B: BrowserSession + ?Sized,
    {
        let report = self.inspect(session, expected).await?;
        if report.is_clean() {
            return Ok(report);
        }
        for mismatch in &report.mismatches {
            warn!(iteration, %mismatch, "rendered block value diverged");
        }
        Err(HarnessError::Assertion {
            iteration,
            report,
        })
    }

    /// Compares the fields of the block expected at `position`.
    async fn inspect_block<B>(
        &self,
        session: &B,
        position: usize,
        block: &Block,
        mismatches: &mut Vec<Mismatch>,
    ) -> Result<(), HarnessError>
    where
        B: BrowserSession + ?Sized,
    {
        let mismatch = |field: String, expected: &str, actual: Option<&str>| Mismatch {
            position,
            variant: block.variant(),
            block_name: block.name().map(str::to_string),
            field,
            expected: expected.to_string(),
            actual: actual.unwrap_or(MISSING_VALUE).to_string(),
        };

        for field in block.visible_text_fields() {
            let expected = field.value.unwrap_or_default();
            let actual = session.input_value(&self.ui.text_input(position, field.path)).await?;
            if actual.as_deref() != Some(expected) {
                mismatches.push(mismatch(field.path.to_string(), expected, actual.as_deref()));
            }
        }

        let relation = block.seed_field();
        let labels =
            session.all_inner_texts(&self.ui.relationship_labels(position, relation)).await?;
        let seeds = block.seeds();
        for index in 0 .. seeds.len().max(labels.len()) {
            let expected = seeds.get(index).map(|seed| seed.name().unwrap_or_default());
            let actual = labels.get(index).map(String::as_str);
            if expected != actual {
                mismatches.push(mismatch(
                    format!("{relation}[{index}]"),
                    expected.unwrap_or(MISSING_VALUE),
                    actual,
                ));
            }
        }
        Ok(())
    }
}
