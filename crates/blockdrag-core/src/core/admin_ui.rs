// crates/blockdrag-core/src/core/admin_ui.rs
// ============================================================================
// Module: Admin UI Contract
// Description: Element selectors the harness relies on in the admin UI.
// Purpose: Keep every DOM assumption about the admin UI in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The admin UI is not owned by this workspace. Its stable hooks are row ids
//! (`<container>-row-<index>`), field ids (`field-<path>`), input names
//! (`<container>.<index>.<path>`), a drag handle inside each row, an expand-all
//! button, and relationship labels rendered as discrete text nodes.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Selector
// ============================================================================

/// Element locator understood by browser sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector.
    Css(String),
    /// XPath expression.
    XPath(String),
}

impl Selector {
    /// Creates a CSS selector.
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    /// Creates an XPath selector.
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(value) => write!(f, "css={value}"),
            Self::XPath(value) => write!(f, "xpath={value}"),
        }
    }
}

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Class of the label node rendered for each related record.
const RELATIONSHIP_LABEL_CLASS: &str = "relationship--multi-value-label__text";

/// Selectors for one blocks field of the admin UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUi {
    /// Name of the blocks field (`blocks`).
    field: String,
}

impl Default for AdminUi {
    fn default() -> Self {
        Self::new("blocks")
    }
}

impl AdminUi {
    /// Creates the contract for the blocks field named `field`.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Container of the whole blocks field.
    #[must_use]
    pub fn field_container(&self) -> Selector {
        Selector::css(format!("#field-{}", self.field))
    }

    /// Row wrapper for the block at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Selector {
        Selector::css(format!("#{}-row-{index}", self.field))
    }

    /// Drag handle of the block at `index`.
    #[must_use]
    pub fn drag_handle(&self, index: usize) -> Selector {
        Selector::css(format!("#{}-row-{index} .collapsible__drag", self.field))
    }

    /// All drag handles; sessions resolve the first match.
    #[must_use]
    pub fn first_drag_handle(&self) -> Selector {
        Selector::css(format!("#field-{} .collapsible__drag", self.field))
    }

    /// Text input for `path` within the block at `index`.
    #[must_use]
    pub fn text_input(&self, index: usize, path: &str) -> Selector {
        Selector::css(format!("input[name=\"{}.{index}.{path}\"]", self.field))
    }

    /// Label nodes of the relationship field `relation` in the block at `index`.
    #[must_use]
    pub fn relationship_labels(&self, index: usize, relation: &str) -> Selector {
        Selector::css(format!(
            "#field-{}__{index}__{relation} div[class=\"{RELATIONSHIP_LABEL_CLASS}\"]",
            self.field
        ))
    }

    /// Button expanding every collapsed row.
    #[must_use]
    pub fn expand_all(&self) -> Selector {
        Selector::xpath("//button[normalize-space(.)='Show All']")
    }

    /// Login email input.
    #[must_use]
    pub fn login_email(&self) -> Selector {
        Selector::css("#field-email")
    }

    /// Login password input.
    #[must_use]
    pub fn login_password(&self) -> Selector {
        Selector::css("#field-password")
    }

    /// Login submit button.
    #[must_use]
    pub fn login_submit(&self) -> Selector {
        Selector::css("[type=submit]")
    }

    /// Marker text shown once the dashboard has loaded.
    #[must_use]
    pub fn dashboard_marker(&self) -> Selector {
        Selector::xpath("//*[contains(normalize-space(text()), 'Dashboard')]")
    }
}
