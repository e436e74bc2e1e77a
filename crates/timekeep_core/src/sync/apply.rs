//! Local mutators: translate received sync payloads into store mutations.
//!
//! # Responsibility
//! - Map each of the five message kinds onto its idempotent collection
//!   mutation.
//! - Bind a coordinator to a store so incoming messages apply locally.
//!
//! # Invariants
//! - Applying a received message never re-broadcasts (no propagation loop).
//! - Applying a received message never pushes undo history: only
//!   locally-authored actions are undoable.

use crate::store::entry_store::{EntryMutation, EntryStore};
use crate::sync::coordinator::{SyncCoordinator, SyncSubscription};
use crate::sync::message::{BulkUpdate, SyncMessageKind, SyncPayload};

/// Translates one received payload into its collection mutation.
///
/// The match is exhaustive over the closed payload enumeration; adding a
/// sixth message kind fails compilation here instead of silently dropping.
pub fn mutation_for(payload: &SyncPayload) -> EntryMutation {
    match payload {
        SyncPayload::EntryAdded(entry) => EntryMutation::Add(entry.clone()),
        SyncPayload::EntryUpdated { id, updates } => EntryMutation::Update {
            id: id.clone(),
            patch: updates.clone(),
        },
        SyncPayload::EntryDeleted { id } => EntryMutation::Delete { id: id.clone() },
        SyncPayload::EntriesBulkUpdate(BulkUpdate::Delete { entry_ids }) => {
            EntryMutation::BulkDelete {
                ids: entry_ids.clone(),
            }
        }
        SyncPayload::EntriesBulkUpdate(BulkUpdate::Category {
            entry_ids,
            category_id,
        }) => EntryMutation::BulkSetCategory {
            ids: entry_ids.clone(),
            category_id: category_id.clone(),
        },
        SyncPayload::EntriesCleared {} => EntryMutation::Clear,
    }
}

/// Keeps a store attached to a coordinator. Dropping the binding detaches
/// the store; in-flight dispatch is not interrupted.
pub struct SyncBinding {
    _subscriptions: Vec<SyncSubscription>,
}

/// Subscribes the store to every message kind on the coordinator.
///
/// The handlers apply mutations directly — bypassing the service layer —
/// so remote edits neither re-broadcast nor become locally undoable.
pub fn bind(coordinator: &SyncCoordinator, store: &EntryStore) -> SyncBinding {
    let subscriptions = SyncMessageKind::ALL
        .iter()
        .map(|kind| {
            let store = store.clone();
            coordinator.subscribe(*kind, move |payload| {
                store.apply(mutation_for(payload))?;
                Ok(())
            })
        })
        .collect();
    SyncBinding {
        _subscriptions: subscriptions,
    }
}

#[cfg(test)]
mod tests {
    use super::mutation_for;
    use crate::store::entry_store::EntryMutation;
    use crate::sync::message::{BulkUpdate, SyncPayload};

    #[test]
    fn bulk_payloads_map_to_their_sub_modes() {
        let delete = mutation_for(&SyncPayload::EntriesBulkUpdate(BulkUpdate::Delete {
            entry_ids: vec!["1".to_string(), "2".to_string()],
        }));
        assert_eq!(
            delete,
            EntryMutation::BulkDelete {
                ids: vec!["1".to_string(), "2".to_string()],
            }
        );

        let recategorize = mutation_for(&SyncPayload::EntriesBulkUpdate(BulkUpdate::Category {
            entry_ids: vec!["1".to_string()],
            category_id: "cat-9".to_string(),
        }));
        assert_eq!(
            recategorize,
            EntryMutation::BulkSetCategory {
                ids: vec!["1".to_string()],
                category_id: "cat-9".to_string(),
            }
        );
    }

    #[test]
    fn cleared_payload_maps_to_clear() {
        assert_eq!(
            mutation_for(&SyncPayload::EntriesCleared {}),
            EntryMutation::Clear
        );
    }
}
