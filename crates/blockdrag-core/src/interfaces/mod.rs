// crates/blockdrag-core/src/interfaces/mod.rs
// ============================================================================
// Module: blockdrag Interfaces
// Description: Backend-agnostic interfaces for the document store and browser.
// Purpose: Define the contract surfaces the harness runtime drives.
// Dependencies: crate::core, async-trait, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! The harness integrates with two external collaborators: the CMS document
//! store (fixture creation and teardown) and a browsing session (navigation,
//! pointer gestures, DOM reads). Both are expressed as traits so the runtime
//! stays transport-agnostic and can be exercised against in-memory fakes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::Collection;
use crate::core::DocId;
use crate::core::NetworkProfile;
use crate::core::Selector;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Poll interval used by the default wait implementations.
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: Document Store
// ============================================================================

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure reaching the store.
    #[error("document store transport error: {0}")]
    Transport(String),
    /// Store rejected the request.
    #[error("document store rejected {operation} (status {status}): {message}")]
    Rejected {
        /// Operation label.
        operation: String,
        /// HTTP-like status code.
        status: u16,
        /// Error detail returned by the store.
        message: String,
    },
    /// Store response could not be interpreted.
    #[error("document store invalid response: {0}")]
    InvalidResponse(String),
    /// Referenced document does not exist.
    #[error("document store missing {collection} document {id}")]
    NotFound {
        /// Collection searched.
        collection: Collection,
        /// Identifier requested.
        id: DocId,
    },
}

/// Typed-collection document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects or cannot be reached.
    async fn create(&self, collection: Collection, data: Value) -> Result<Value, StoreError>;

    /// Deletes a document by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the deletion fails.
    async fn delete(&self, collection: Collection, id: &DocId) -> Result<(), StoreError>;

    /// Deletes every document whose identifier is in `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when any deletion fails.
    async fn delete_where_id_in(
        &self,
        collection: Collection,
        ids: &[DocId],
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Browser Geometry
// ============================================================================

/// Point in viewport CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
        }
    }
}

/// Element bounding box in viewport CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoundingBox {
    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns true when the box contains `point` (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

// ============================================================================
// SECTION: Browser Session
// ============================================================================

/// Browser session errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Transport failure reaching the browser driver.
    #[error("browser transport error: {0}")]
    Transport(String),
    /// Browser driver returned an error or malformed payload.
    #[error("browser protocol error: {0}")]
    Protocol(String),
    /// Element required for an interaction is not present.
    #[error("element not found: {0}")]
    NotFound(Selector),
    /// Wait condition did not hold before the deadline.
    #[error("browser wait timed out: {0}")]
    Timeout(String),
    /// Pointer target lies outside the browser viewport.
    #[error("pointer target outside the viewport: {0}")]
    OutOfBounds(String),
}

/// Browsing session driven by the harness.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates to `url` and waits for the load to settle.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when navigation fails.
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the URL cannot be read.
    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Clicks the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotFound`] when nothing matches.
    async fn click(&self, selector: &Selector) -> Result<(), BrowserError>;

    /// Replaces the value of the input matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotFound`] when nothing matches.
    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), BrowserError>;

    /// Returns true when an element matching `selector` is rendered.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the lookup fails.
    async fn is_visible(&self, selector: &Selector) -> Result<bool, BrowserError>;

    /// Returns the bounding box of the first match, `None` when not rendered.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the lookup fails.
    async fn bounding_box(&self, selector: &Selector)
    -> Result<Option<BoundingBox>, BrowserError>;

    /// Moves the pointer over the center of the first match.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NotFound`] when nothing matches.
    async fn hover(&self, selector: &Selector) -> Result<(), BrowserError>;

    /// Presses the primary pointer button at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the action fails.
    async fn pointer_down(&self) -> Result<(), BrowserError>;

    /// Moves the pointer to `to` through `steps` evenly spaced positions.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the action fails.
    async fn pointer_move(&self, to: Point, steps: u32) -> Result<(), BrowserError>;

    /// Releases the primary pointer button.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the action fails.
    async fn pointer_up(&self) -> Result<(), BrowserError>;

    /// Returns the current value of the input matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the lookup fails.
    async fn input_value(&self, selector: &Selector) -> Result<Option<String>, BrowserError>;

    /// Returns the rendered text of every match, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the lookup fails.
    async fn all_inner_texts(&self, selector: &Selector) -> Result<Vec<String>, BrowserError>;

    /// Applies network conditions for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the browser rejects the profile.
    async fn emulate_network(&self, profile: &NetworkProfile) -> Result<(), BrowserError>;

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver fails to close it.
    async fn close(&self) -> Result<(), BrowserError>;

    /// Waits until the current URL equals `url`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Timeout`] when the URL does not match in time.
    async fn wait_for_url(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let start = Instant::now();
        loop {
            let current = self.current_url().await?;
            if current.trim_end_matches('/') == url.trim_end_matches('/') {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout(format!(
                    "expected url {url}, still at {current}"
                )));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Waits until an element matching `selector` is rendered.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Timeout`] when nothing is rendered in time.
    async fn wait_for_selector(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let start = Instant::now();
        loop {
            if self.is_visible(selector).await? {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(BrowserError::Timeout(format!("{selector} not visible")));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}
