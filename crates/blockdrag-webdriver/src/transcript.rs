// crates/blockdrag-webdriver/src/transcript.rs
// ============================================================================
// Module: WebDriver Transcript
// Description: Ordered record of WebDriver commands and replies.
// Dependencies: serde, serde_json
// ============================================================================

//! Transcript capture shared between a session and its owner.

use std::sync::Arc;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

/// One WebDriver command and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// 1-based position in the transcript.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Command path below the driver root.
    pub path: String,
    /// Request body, `null` for bodiless commands.
    pub request: Value,
    /// Decoded reply, `null` when none arrived.
    pub response: Value,
    /// Failure description.
    pub error: Option<String>,
}

/// Shared, append-only transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Recorded entries.
    entries: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the entries.
    #[must_use]
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Appends an entry, assigning the next sequence number.
    pub(crate) fn record(
        &self,
        method: &str,
        path: &str,
        request: Value,
        response: Value,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.entries.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method: method.to_string(),
            path: path.to_string(),
            request,
            response,
            error,
        });
    }
}
