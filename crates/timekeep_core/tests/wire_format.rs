use serde_json::json;
use timekeep_core::{BulkUpdate, SyncEnvelope, SyncPayload, TimeEntry};

fn sample_entry() -> TimeEntry {
    serde_json::from_value(json!({
        "id": "entry-1",
        "categoryId": "cat-1",
        "date": "2026-08-07",
        "start": "09:00",
        "end": "10:30",
        "duration": 90,
        "earned": 45.0,
        "rate": 30.0,
        "createdAt": 1_700_000_000_000_i64,
        "updatedAt": 1_700_000_000_000_i64,
    }))
    .expect("sample entry should decode")
}

#[test]
fn envelope_serializes_to_the_stable_wire_shape() {
    let envelope = SyncEnvelope {
        payload: SyncPayload::EntryDeleted {
            id: "entry-1".to_string(),
        },
        timestamp: 1_700_000_123_456,
        source: "tab-1700000000000-ab12cd34".to_string(),
    };

    let wire = serde_json::to_value(&envelope).expect("envelope should encode");
    assert_eq!(
        wire,
        json!({
            "type": "entry-deleted",
            "data": { "id": "entry-1" },
            "timestamp": 1_700_000_123_456_i64,
            "source": "tab-1700000000000-ab12cd34",
        })
    );
}

#[test]
fn all_five_type_strings_decode() {
    let shapes = [
        json!({ "type": "entry-added", "data": {
            "id": "e1", "categoryId": "c1", "date": "2026-08-07",
            "start": "09:00", "end": "10:00",
            "duration": 60, "earned": 10, "rate": 10,
        }}),
        json!({ "type": "entry-updated", "data": { "id": "e1", "updates": { "earned": 12 } } }),
        json!({ "type": "entry-deleted", "data": { "id": "e1" } }),
        json!({ "type": "entries-bulk-update", "data": {
            "type": "category", "entryIds": ["e1"], "categoryId": "c2",
        }}),
        json!({ "type": "entries-cleared", "data": {} }),
    ];

    for mut shape in shapes {
        shape["timestamp"] = json!(1_700_000_000_000_i64);
        shape["source"] = json!("tab-x");
        serde_json::from_value::<SyncEnvelope>(shape.clone())
            .unwrap_or_else(|err| panic!("shape {shape} should decode: {err}"));
    }
}

#[test]
fn entry_record_uses_camel_case_field_names() {
    let entry = sample_entry();
    let wire = serde_json::to_value(&entry).expect("entry should encode");

    assert_eq!(wire["categoryId"], "cat-1");
    assert_eq!(wire["createdAt"], 1_700_000_000_000_i64);
    assert_eq!(wire["updatedAt"], 1_700_000_000_000_i64);
    assert_eq!(wire["duration"], 90.0);
    assert!(wire.get("category_id").is_none());
}

#[test]
fn bulk_update_payload_carries_its_inner_discriminator() {
    let payload = SyncPayload::EntriesBulkUpdate(BulkUpdate::Delete {
        entry_ids: vec!["e1".to_string(), "e2".to_string()],
    });

    let wire = serde_json::to_value(&payload).expect("payload should encode");
    assert_eq!(
        wire,
        json!({
            "type": "entries-bulk-update",
            "data": { "type": "delete", "entryIds": ["e1", "e2"] },
        })
    );
}

#[test]
fn numeric_wire_ids_normalize_to_strings_everywhere() {
    let envelope: SyncEnvelope = serde_json::from_value(json!({
        "type": "entries-bulk-update",
        "data": { "type": "delete", "entryIds": [17, "e2"] },
        "timestamp": 1_700_000_000_000_i64,
        "source": "tab-y",
    }))
    .expect("numeric ids should decode");

    assert_eq!(
        envelope.payload,
        SyncPayload::EntriesBulkUpdate(BulkUpdate::Delete {
            entry_ids: vec!["17".to_string(), "e2".to_string()],
        })
    );
}

#[test]
fn envelope_with_unknown_type_is_rejected() {
    let bad = serde_json::from_value::<SyncEnvelope>(json!({
        "type": "entries-compacted",
        "data": {},
        "timestamp": 0,
        "source": "tab-z",
    }));
    assert!(bad.is_err(), "the type enumeration is a closed contract");
}
