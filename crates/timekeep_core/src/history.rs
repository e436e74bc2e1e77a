//! Bounded linear undo/redo over full-collection snapshots.
//!
//! # Responsibility
//! - Keep pre-mutation snapshots of the entry collection, bounded in depth.
//! - Restore snapshots into the owned store reference on undo/redo.
//!
//! # Invariants
//! - Undo depth never exceeds the configured capacity; the oldest snapshot
//!   is evicted first.
//! - Any new push clears the redo stack: history is linear, never branched.
//! - `undo()` immediately followed by `redo()` restores the exact
//!   collection state from before the `undo()` call.
//!
//! Snapshot decisions belong to locally-authored call sites; mutations
//! arriving over sync must not push here, or every remote edit would become
//! locally undoable.

use crate::model::entry::TimeEntry;
use crate::store::entry_store::EntryStore;
use std::collections::VecDeque;

/// Default bound on undo depth.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Immutable full copy of the collection, paired with the action label
/// shown to the user ("Added entry", "Deleted 3 entries", ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub entries: Vec<TimeEntry>,
    pub label: String,
}

/// Linear undo/redo stacks over one entry store.
pub struct HistoryManager {
    store: EntryStore,
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
    last_action: String,
}

impl HistoryManager {
    pub fn new(store: EntryStore) -> Self {
        Self::with_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    /// A zero capacity is clamped to 1; a bound of nothing would make every
    /// push silently unrecoverable.
    pub fn with_capacity(store: EntryStore, capacity: usize) -> Self {
        Self {
            store,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity: capacity.max(1),
            last_action: String::new(),
        }
    }

    /// Records a pre-mutation snapshot under `label`.
    ///
    /// Evicts the oldest snapshot past capacity and clears the redo stack.
    pub fn push_to_undo(&mut self, entries: Vec<TimeEntry>, label: &str) {
        self.undo_stack.push_back(Snapshot {
            entries,
            label: label.to_string(),
        });
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        self.last_action = label.to_string();
    }

    /// Restores the most recent undo snapshot into the store.
    ///
    /// The store's current state moves onto the redo stack first, which is
    /// what makes an immediate `redo()` an exact round trip. Returns the
    /// restored entries, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<TimeEntry>> {
        let snapshot = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(Snapshot {
            entries: self.store.snapshot(),
            label: snapshot.label.clone(),
        });
        self.store.replace_all(snapshot.entries.clone());
        Some(snapshot.entries)
    }

    /// Symmetric to `undo`: re-applies the most recently undone state.
    pub fn redo(&mut self) -> Option<Vec<TimeEntry>> {
        let snapshot = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(Snapshot {
            entries: self.store.snapshot(),
            label: snapshot.label.clone(),
        });
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.store.replace_all(snapshot.entries.clone());
        Some(snapshot.entries)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the most recently pushed action; empty when none.
    pub fn last_action(&self) -> &str {
        &self.last_action
    }

    /// Empties both stacks and resets the last action label.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_action.clear();
    }
}
