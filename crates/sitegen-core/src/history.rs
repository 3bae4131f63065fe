//! Snapshot history for undo.

use std::collections::VecDeque;

use crate::document::Document;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Linear stack of whole-document snapshots.
///
/// There is no redo stack: popping a snapshot discards it.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Document>,
    limit: usize,
}

impl History {
    /// Create a history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history that keeps at most `limit` snapshots (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Record a snapshot, dropping the oldest past the limit.
    pub fn push(&mut self, snapshot: Document) {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
    }

    /// Take the most recent snapshot.
    pub fn pop(&mut self) -> Option<Document> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
