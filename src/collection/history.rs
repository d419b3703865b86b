//! Bounded undo/redo history of collection snapshots.

use std::sync::Arc;

use super::entry::Slot;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Immutable copy of the sparse collection taken before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    slots: Vec<Slot>,
}

impl Snapshot {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }
}

/// Linear undo/redo stacks. Recording a new snapshot discards the redo branch.
#[derive(Debug)]
pub struct History {
    undo: Vec<Arc<Snapshot>>,
    redo: Vec<Arc<Snapshot>>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a mutation.
    pub fn push(&mut self, snapshot: Arc<Snapshot>) {
        self.undo.push(snapshot);
        if self.undo.len() > self.limit {
            let overflow = self.undo.len() - self.limit;
            self.undo.drain(0..overflow);
        }
        self.redo.clear();
    }

    /// Step back. `current` becomes the redo target.
    pub fn undo(&mut self, current: Snapshot) -> Option<Arc<Snapshot>> {
        let previous = self.undo.pop()?;
        self.redo.push(Arc::new(current));
        Some(previous)
    }

    /// Step forward. `current` becomes the undo target.
    pub fn redo(&mut self, current: Snapshot) -> Option<Arc<Snapshot>> {
        let next = self.redo.pop()?;
        self.undo.push(Arc::new(current));
        Some(next)
    }

    /// Drop a recorded snapshot, e.g. after rolling back to it.
    pub fn discard(&mut self, snapshot: &Arc<Snapshot>) -> bool {
        match self.undo.iter().rposition(|s| Arc::ptr_eq(s, snapshot)) {
            Some(index) => {
                self.undo.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
