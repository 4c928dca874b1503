use local_store::{InMemoryStore, LocalStorage, StoreError, UpdatePolicy};

use crate::entities::Note;

#[test]
fn modify_keeps_fields_absent_from_incoming() {
    let storage = LocalStorage::new(InMemoryStore::new());
    storage
        .save(&Note::new(1, "draft").with_body("keep me"))
        .unwrap();

    // body is None, so it is not serialized and the stored body survives
    storage
        .save_one(&Note::new(1, "final"), UpdatePolicy::Modify)
        .unwrap();

    let stored = storage.read_by_key::<Note>(&1).unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.body.as_deref(), Some("keep me"));
}

#[test]
fn replace_all_drops_fields_absent_from_incoming() {
    let storage = LocalStorage::new(InMemoryStore::new());
    storage
        .save(&Note::new(1, "draft").with_body("gone"))
        .unwrap();

    storage
        .save_one(&Note::new(1, "final"), UpdatePolicy::ReplaceAll)
        .unwrap();

    assert_eq!(storage.read_by_key::<Note>(&1), Some(Note::new(1, "final")));
}

#[test]
fn modify_applies_to_every_entity_in_batch() {
    let storage = LocalStorage::new(InMemoryStore::new());
    storage
        .save_all(&[
            Note::new(1, "a").with_body("one"),
            Note::new(2, "b").with_body("two"),
        ])
        .unwrap();

    storage
        .save_many(
            &[Note::new(1, "A"), Note::new(2, "B"), Note::new(3, "C")],
            UpdatePolicy::Modify,
        )
        .unwrap();

    let notes = storage.read_all::<Note>(None).unwrap();
    assert_eq!(
        notes,
        vec![
            Note::new(1, "A").with_body("one"),
            Note::new(2, "B").with_body("two"),
            Note::new(3, "C"),
        ]
    );
}

#[test]
fn error_policy_rejects_occupied_key() {
    let storage = LocalStorage::new(InMemoryStore::new());
    storage
        .save_one(&Note::new(1, "first"), UpdatePolicy::Error)
        .unwrap();

    let err = storage
        .save_one(&Note::new(1, "second"), UpdatePolicy::Error)
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateKey { ref collection, .. } if collection == "notes"));
    assert_eq!(storage.read_by_key::<Note>(&1).unwrap().title, "first");
}

#[test]
fn rejected_batch_writes_nothing() {
    let storage = LocalStorage::new(InMemoryStore::new());
    storage.save(&Note::new(2, "existing")).unwrap();

    let err = storage
        .save_many(
            &[Note::new(1, "new"), Note::new(2, "clash"), Note::new(3, "new")],
            UpdatePolicy::Error,
        )
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateKey { .. }));
    assert_eq!(
        storage.read_all::<Note>(None),
        Some(vec![Note::new(2, "existing")])
    );
}

#[test]
fn error_policy_rejects_duplicates_within_one_batch() {
    let storage = LocalStorage::new(InMemoryStore::new());

    let err = storage
        .save_many(&[Note::new(1, "a"), Note::new(1, "b")], UpdatePolicy::Error)
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateKey { .. }));
    assert_eq!(storage.read_all::<Note>(None), Some(vec![]));
}

#[test]
fn replace_all_batch_last_write_wins() {
    let storage = LocalStorage::new(InMemoryStore::new());

    storage
        .save_all(&[Note::new(1, "a"), Note::new(1, "b")])
        .unwrap();

    assert_eq!(storage.read_all::<Note>(None), Some(vec![Note::new(1, "b")]));
}
