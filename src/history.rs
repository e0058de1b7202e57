//! Snapshot-based undo/redo over the object list.
//!
//! Every entry is a whole `ObjectList` captured immediately before a
//! committing mutation. Because lists are immutable and shared, a snapshot is
//! a reference-count bump, not a deep copy.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::doc::ObjectList;

/// Undo and redo stacks of object-list snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<ObjectList>,
    redo_stack: Vec<ObjectList>,
    limit: usize,
}

impl History {
    /// Create an empty history keeping at most `limit` undo entries
    /// (`limit` is raised to 1 if zero).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { undo_stack: Vec::new(), redo_stack: Vec::new(), limit: limit.max(1) }
    }

    /// Record the list as it was before a committing mutation. Clears redo.
    pub fn push(&mut self, before: ObjectList) {
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.limit {
            let overflow = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..overflow);
        }
        self.redo_stack.clear();
    }

    /// Pop the most recent snapshot, remembering `current` for redo.
    /// Returns the list to apply, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: ObjectList) -> Option<ObjectList> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Mirror of [`Self::undo`].
    pub fn redo(&mut self, current: ObjectList) -> Option<ObjectList> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
