use timekeep_core::{
    CoreConfig, CoreSession, EntryDraft, EntryPatch, InProcessTransport, StoreError, TimeEntry,
};

fn draft(category: &str, earned: f64) -> EntryDraft {
    EntryDraft {
        category_id: category.to_string(),
        date: "2026-08-07".to_string(),
        start: "09:00".to_string(),
        end: "10:00".to_string(),
        duration: 60.0,
        earned,
        rate: earned,
        category: None,
        description: None,
    }
}

fn session() -> CoreSession {
    CoreSession::start(&InProcessTransport::new(), &CoreConfig::default())
        .expect("session should start")
}

#[test]
fn add_entry_assigns_id_and_records_the_action() {
    let mut session = session();

    let id = session
        .service()
        .add_entry(draft("cat-1", 25.0))
        .expect("add should succeed");

    assert!(session.store().get(&id).is_some());
    assert!(session.service().can_undo());
    assert_eq!(session.service().last_action(), "Added entry");
}

#[test]
fn invalid_draft_leaves_store_and_history_untouched() {
    let mut session = session();

    let err = session
        .service()
        .add_entry(draft("cat-1", -1.0))
        .expect_err("negative earned must be rejected");
    assert!(matches!(err, StoreError::Validation(_)));

    assert!(session.store().is_empty());
    assert!(!session.service().can_undo());
}

#[test]
fn undo_through_the_service_reverts_the_last_action() {
    let mut session = session();

    let id = session.service().add_entry(draft("cat-1", 25.0)).unwrap();
    session
        .service()
        .update_entry(
            &id,
            EntryPatch {
                description: Some("tweaked".to_string()),
                ..EntryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(
        session.store().get(&id).unwrap().description.as_deref(),
        Some("tweaked")
    );

    session.service().undo().expect("undo should succeed");
    assert_eq!(session.store().get(&id).unwrap().description, None);

    session.service().redo().expect("redo should succeed");
    assert_eq!(
        session.store().get(&id).unwrap().description.as_deref(),
        Some("tweaked")
    );
}

#[test]
fn bulk_labels_carry_the_affected_count() {
    let mut session = session();
    let first = session.service().add_entry(draft("cat-1", 1.0)).unwrap();
    let second = session.service().add_entry(draft("cat-1", 2.0)).unwrap();

    session
        .service()
        .bulk_delete(&[first, second])
        .expect("bulk delete should succeed");

    assert_eq!(session.service().last_action(), "Deleted 2 entries");
    assert!(session.store().is_empty());
}

#[test]
fn import_deduplicates_by_id_and_is_undoable() {
    let mut session = session();
    session.service().add_entry(draft("cat-1", 1.0)).unwrap();

    let mut original = TimeEntry::from_draft(draft("cat-2", 5.0), 1_000);
    original.id = "imported-1".to_string();
    let mut duplicate = TimeEntry::from_draft(draft("cat-3", 9.0), 2_000);
    duplicate.id = "imported-1".to_string();

    let imported = session
        .service()
        .import_entries(vec![original.clone(), duplicate])
        .expect("import should succeed");

    assert_eq!(imported, 1, "duplicate ids keep their first occurrence");
    assert_eq!(session.store().snapshot(), vec![original]);
    assert_eq!(session.service().last_action(), "Imported entries");

    let restored = session.service().undo().expect("undo should succeed");
    assert_eq!(restored.len(), 1, "pre-import collection comes back");
    assert_eq!(session.store().len(), 1);
    assert!(session.store().get("imported-1").is_none());
}
