// crates/blockdrag-core/src/runtime/tracker.rs
// ============================================================================
// Module: Expected-Order Tracker
// Description: In-memory oracle of the order the admin UI should render.
// Purpose: Mirror every reorder gesture with list-splice semantics.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The tracker is mutated only by the drag driver and never read by the UI.
//! A reorder removes the element at `from` and reinserts it at `to`, where
//! `to` is interpreted against the list after removal.

use thiserror::Error;

/// Tracker errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Reorder index outside the tracked sequence.
    #[error("reorder index {index} out of range for {len} tracked entries")]
    OutOfRange {
        /// Offending index.
        index: usize,
        /// Tracked length.
        len: usize,
    },
}

/// Ordered sequence of expected entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpectedOrder<T> {
    /// Entries in expected display order.
    entries: Vec<T>,
}

impl<T> ExpectedOrder<T> {
    /// Creates a tracker seeded with `entries` in display order.
    #[must_use]
    pub const fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
        }
    }

    /// Moves the entry at `from` so it ends up at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::OutOfRange`] when either index is outside the
    /// sequence.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), TrackerError> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(TrackerError::OutOfRange {
                    index,
                    len,
                });
            }
        }
        if from == to {
            return Ok(());
        }
        let moved = self.entries.remove(from);
        self.entries.insert(to, moved);
        Ok(())
    }

    /// Returns the entries in expected order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Returns the number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first position whose entry satisfies `predicate`.
    pub fn position_of(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.entries.iter().position(predicate)
    }

    /// Consumes the tracker and returns the entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.entries
    }
}
