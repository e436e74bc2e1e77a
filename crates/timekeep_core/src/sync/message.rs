//! Sync message envelope and payload enumeration.
//!
//! # Responsibility
//! - Pin the wire contract: `{ type, data, timestamp, source }` with five
//!   enumerated type strings.
//! - Normalize record ids to strings at the decode boundary, whatever JSON
//!   representation a peer used.
//!
//! # Invariants
//! - The payload enumeration is closed; an unknown `type` fails to decode
//!   instead of dispatching to an open-ended key.
//! - Outbound ids always serialize as strings.

use crate::model::entry::{EntryPatch, TimeEntry};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Message kind discriminator, used to key handler registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMessageKind {
    EntryAdded,
    EntryUpdated,
    EntryDeleted,
    EntriesBulkUpdate,
    EntriesCleared,
}

impl SyncMessageKind {
    /// Every kind, in the order mutator bindings register them.
    pub const ALL: [SyncMessageKind; 5] = [
        SyncMessageKind::EntryAdded,
        SyncMessageKind::EntryUpdated,
        SyncMessageKind::EntryDeleted,
        SyncMessageKind::EntriesBulkUpdate,
        SyncMessageKind::EntriesCleared,
    ];

    /// Wire string carried in the envelope `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryAdded => "entry-added",
            Self::EntryUpdated => "entry-updated",
            Self::EntryDeleted => "entry-deleted",
            Self::EntriesBulkUpdate => "entries-bulk-update",
            Self::EntriesCleared => "entries-cleared",
        }
    }
}

/// Payload of one sync message, adjacently tagged onto `type`/`data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SyncPayload {
    /// A record was created; carries the full record.
    #[serde(rename = "entry-added")]
    EntryAdded(TimeEntry),
    /// A record was partially updated.
    #[serde(rename = "entry-updated")]
    EntryUpdated {
        #[serde(deserialize_with = "entry_id_from_wire")]
        id: String,
        #[serde(default)]
        updates: EntryPatch,
    },
    /// A record was removed.
    #[serde(rename = "entry-deleted")]
    EntryDeleted {
        #[serde(deserialize_with = "entry_id_from_wire")]
        id: String,
    },
    /// A set of records was deleted or re-categorized in one step.
    #[serde(rename = "entries-bulk-update")]
    EntriesBulkUpdate(BulkUpdate),
    /// The whole collection was emptied.
    #[serde(rename = "entries-cleared")]
    EntriesCleared {},
}

impl SyncPayload {
    pub fn kind(&self) -> SyncMessageKind {
        match self {
            Self::EntryAdded(_) => SyncMessageKind::EntryAdded,
            Self::EntryUpdated { .. } => SyncMessageKind::EntryUpdated,
            Self::EntryDeleted { .. } => SyncMessageKind::EntryDeleted,
            Self::EntriesBulkUpdate(_) => SyncMessageKind::EntriesBulkUpdate,
            Self::EntriesCleared {} => SyncMessageKind::EntriesCleared,
        }
    }
}

/// Bulk operation payload, discriminated by its own inner `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BulkUpdate {
    #[serde(rename = "delete", rename_all = "camelCase")]
    Delete {
        #[serde(deserialize_with = "entry_ids_from_wire")]
        entry_ids: Vec<String>,
    },
    #[serde(rename = "category", rename_all = "camelCase")]
    Category {
        #[serde(deserialize_with = "entry_ids_from_wire")]
        entry_ids: Vec<String>,
        category_id: String,
    },
}

/// Stable wire envelope: payload tag/body plus sender metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    #[serde(flatten)]
    pub payload: SyncPayload,
    /// Sender wall-clock, epoch milliseconds. Informational only.
    pub timestamp: i64,
    /// Identity of the sending instance; receivers drop their own echoes.
    pub source: String,
}

fn id_to_string<E: serde::de::Error>(raw: Value) -> Result<String, E> {
    match raw {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(E::custom(format!(
            "entry id must be a string or number, got {other}"
        ))),
    }
}

fn entry_id_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_to_string(Value::deserialize(deserializer)?)
}

fn entry_ids_from_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(id_to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{BulkUpdate, SyncMessageKind, SyncPayload};
    use serde_json::json;

    #[test]
    fn kind_round_trips_through_wire_strings() {
        for kind in SyncMessageKind::ALL {
            assert!(!kind.as_str().is_empty());
        }
        assert_eq!(SyncMessageKind::EntriesBulkUpdate.as_str(), "entries-bulk-update");
    }

    #[test]
    fn numeric_ids_normalize_to_strings() {
        let payload: SyncPayload = serde_json::from_value(json!({
            "type": "entry-deleted",
            "data": { "id": 42 },
        }))
        .expect("numeric id should decode");

        assert_eq!(
            payload,
            SyncPayload::EntryDeleted {
                id: "42".to_string()
            }
        );
    }

    #[test]
    fn bulk_update_requires_known_discriminator() {
        let bad = serde_json::from_value::<BulkUpdate>(json!({
            "type": "rename",
            "entryIds": ["1"],
        }));
        assert!(bad.is_err(), "unknown bulk discriminator must not decode");
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let bad = serde_json::from_value::<SyncPayload>(json!({
            "type": "entry-archived",
            "data": {},
        }));
        assert!(bad.is_err(), "the payload enumeration is closed");
    }
}
