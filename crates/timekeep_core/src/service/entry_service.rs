//! Entry use-case service: the locally-authored mutation call sites.
//!
//! # Responsibility
//! - Run every local action through the same sequence: pre-mutation
//!   history push, store apply, sync broadcast.
//! - Own the undo/redo entry points.
//!
//! # Invariants
//! - Only locally-authored actions create undo history; mutations arriving
//!   over sync bypass this service entirely (see `sync::apply`).
//! - Undo/redo restores and imports are local-only: the wire enumeration
//!   has no message kind for them, so they are never broadcast.
//! - A validation failure leaves both the store and the history untouched.

use crate::clock::now_epoch_ms;
use crate::history::HistoryManager;
use crate::model::entry::{EntryDraft, EntryId, EntryPatch, TimeEntry};
use crate::store::entry_store::{EntryMutation, EntryStore, StoreResult};
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::message::{BulkUpdate, SyncPayload};
use std::collections::HashSet;

/// Service wrapper coordinating store, history and sync for local edits.
pub struct EntryService {
    store: EntryStore,
    coordinator: SyncCoordinator,
    history: HistoryManager,
}

impl EntryService {
    pub fn new(store: EntryStore, coordinator: SyncCoordinator) -> Self {
        let history = HistoryManager::new(store.clone());
        Self {
            store,
            coordinator,
            history,
        }
    }

    pub fn with_history_capacity(
        store: EntryStore,
        coordinator: SyncCoordinator,
        capacity: usize,
    ) -> Self {
        let history = HistoryManager::with_capacity(store.clone(), capacity);
        Self {
            store,
            coordinator,
            history,
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Creates a record from a draft and fans it out.
    pub fn add_entry(&mut self, draft: EntryDraft) -> StoreResult<EntryId> {
        let entry = TimeEntry::from_draft(draft, now_epoch_ms());
        entry.validate()?;

        self.remember("Added entry");
        self.store.apply(EntryMutation::Add(entry.clone()))?;
        let _delivered = self
            .coordinator
            .broadcast(SyncPayload::EntryAdded(entry.clone()));
        Ok(entry.id)
    }

    /// Merges a partial update into the record with `id`.
    ///
    /// Returns whether anything changed; updating an unknown id is a no-op,
    /// mirroring the idempotent remote-apply semantics.
    pub fn update_entry(&mut self, id: &str, patch: EntryPatch) -> StoreResult<bool> {
        self.remember("Updated entry");
        let changed = self.store.apply(EntryMutation::Update {
            id: id.to_string(),
            patch: patch.clone(),
        })?;
        if changed {
            let _delivered = self.coordinator.broadcast(SyncPayload::EntryUpdated {
                id: id.to_string(),
                updates: patch,
            });
        }
        Ok(changed)
    }

    pub fn delete_entry(&mut self, id: &str) -> StoreResult<bool> {
        self.remember("Deleted entry");
        let changed = self.store.apply(EntryMutation::Delete { id: id.to_string() })?;
        if changed {
            let _delivered = self
                .coordinator
                .broadcast(SyncPayload::EntryDeleted { id: id.to_string() });
        }
        Ok(changed)
    }

    /// Removes every record whose id is in `ids`.
    pub fn bulk_delete(&mut self, ids: &[String]) -> StoreResult<bool> {
        self.remember(&format!("Deleted {} entries", ids.len()));
        let changed = self.store.apply(EntryMutation::BulkDelete {
            ids: ids.to_vec(),
        })?;
        if changed {
            let _delivered =
                self.coordinator
                    .broadcast(SyncPayload::EntriesBulkUpdate(BulkUpdate::Delete {
                        entry_ids: ids.to_vec(),
                    }));
        }
        Ok(changed)
    }

    /// Moves every record in `ids` to `category_id`.
    pub fn bulk_set_category(&mut self, ids: &[String], category_id: &str) -> StoreResult<bool> {
        self.remember("Changed category");
        let changed = self.store.apply(EntryMutation::BulkSetCategory {
            ids: ids.to_vec(),
            category_id: category_id.to_string(),
        })?;
        if changed {
            let _delivered =
                self.coordinator
                    .broadcast(SyncPayload::EntriesBulkUpdate(BulkUpdate::Category {
                        entry_ids: ids.to_vec(),
                        category_id: category_id.to_string(),
                    }));
        }
        Ok(changed)
    }

    pub fn clear_entries(&mut self) -> StoreResult<bool> {
        self.remember("Cleared all entries");
        let changed = self.store.apply(EntryMutation::Clear)?;
        if changed {
            let _delivered = self.coordinator.broadcast(SyncPayload::EntriesCleared {});
        }
        Ok(changed)
    }

    /// Replaces the collection with imported records.
    ///
    /// Duplicate ids keep their first occurrence. Local-only: there is no
    /// wire message kind for imports.
    pub fn import_entries(&mut self, entries: Vec<TimeEntry>) -> StoreResult<usize> {
        for entry in &entries {
            entry.validate()?;
        }
        let mut seen = HashSet::new();
        let deduped: Vec<TimeEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();

        self.remember("Imported entries");
        let imported = deduped.len();
        self.store.replace_all(deduped);
        Ok(imported)
    }

    pub fn undo(&mut self) -> Option<Vec<TimeEntry>> {
        self.history.undo()
    }

    pub fn redo(&mut self) -> Option<Vec<TimeEntry>> {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn last_action(&self) -> &str {
        self.history.last_action()
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
    }

    fn remember(&mut self, label: &str) {
        let snapshot = self.store.snapshot();
        self.history.push_to_undo(snapshot, label);
    }
}
