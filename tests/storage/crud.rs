use local_store::{Entity, InMemoryStore, LocalStorage, UpdatePolicy};

use crate::entities::{Note, Tag};
use crate::init_tracing;

fn storage() -> LocalStorage<InMemoryStore> {
    init_tracing();
    LocalStorage::new(InMemoryStore::new())
}

#[test]
fn derive_uses_marked_key_and_defaults() {
    assert_eq!(Note::COLLECTION, "notes");
    assert_eq!(Tag::COLLECTION, "tags");
    assert_eq!(Note::new(7, "x").primary_key(), &7);
    assert_eq!(Tag::new("rust", "Rust").primary_key(), "rust");
}

#[test]
fn saving_same_key_twice_keeps_one_record() {
    let storage = storage();

    storage.save(&Note::new(1, "a")).unwrap();
    storage.save(&Note::new(1, "b")).unwrap();

    let notes = storage.read_all::<Note>(None).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "b");
}

#[test]
fn create_then_read_round_trips() {
    let storage = storage();
    let note = Note::new(1, "groceries").with_body("milk, eggs").pinned();

    storage.save_one(&note, UpdatePolicy::ReplaceAll).unwrap();

    assert_eq!(storage.read_one(&note), Some(note.clone()));
    assert_eq!(storage.read_by_key::<Note>(&1), Some(note));
}

#[test]
fn read_of_missing_key_is_none() {
    let storage = storage();
    assert_eq!(storage.read_one(&Note::new(404, "")), None);
    assert_eq!(storage.read_all::<Note>(None), Some(vec![]));
}

#[test]
fn delete_then_read_and_delete_again() {
    let storage = storage();
    let note = Note::new(1, "temp");

    storage.save(&note).unwrap();
    storage.delete_one(&note).unwrap();

    assert_eq!(storage.read_all::<Note>(None), Some(vec![]));
    let err = storage.delete_one(&note).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_matches_on_key_not_fields() {
    let storage = storage();
    storage.save(&Note::new(1, "stored title")).unwrap();

    storage.delete_one(&Note::new(1, "different title")).unwrap();
    assert!(storage.read_by_key::<Note>(&1).is_none());
}

#[test]
fn predicate_selects_single_record() {
    let storage = storage();
    storage
        .save_all(&[
            Note::new(1, "alpha"),
            Note::new(2, "beta").pinned(),
            Note::new(3, "gamma"),
        ])
        .unwrap();

    let pinned = storage
        .read_all::<Note>(Some(&|n: &Note| n.pinned))
        .unwrap();
    assert_eq!(pinned, vec![Note::new(2, "beta").pinned()]);
}

#[test]
fn delete_all_of_type_leaves_other_types() {
    let storage = storage();
    storage
        .save_all(&[Note::new(1, "a"), Note::new(2, "b")])
        .unwrap();
    storage
        .save_all(&[Tag::new("x", "X"), Tag::new("y", "Y")])
        .unwrap();

    assert_eq!(storage.delete_all_of_type::<Note>().unwrap(), 2);

    assert_eq!(storage.read_all::<Note>(None), Some(vec![]));
    assert_eq!(storage.read_all::<Tag>(None).unwrap().len(), 2);
}

#[test]
fn same_key_in_different_collections_is_independent() {
    let storage = storage();

    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, Entity)]
    struct Label {
        id: String,
    }

    storage.save(&Tag::new("shared", "tag")).unwrap();
    storage
        .save(&Label {
            id: "shared".into(),
        })
        .unwrap();

    storage.delete_one(&Tag::new("shared", "")).unwrap();
    assert!(storage.read_by_key::<Label>(&"shared".to_string()).is_some());
}

#[test]
fn delete_everything_clears_all_types() {
    let storage = storage();
    storage.save(&Note::new(1, "a")).unwrap();
    storage.save(&Tag::new("x", "X")).unwrap();

    storage.delete_everything().unwrap();

    assert_eq!(storage.read_all::<Note>(None), Some(vec![]));
    assert_eq!(storage.read_all::<Tag>(None), Some(vec![]));
    assert!(storage.provider().is_empty().unwrap());
}

#[test]
fn delete_many_removes_atomically() {
    let storage = storage();
    storage
        .save_all(&[Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")])
        .unwrap();

    let removed = storage
        .delete_many(&[Note::new(1, ""), Note::new(3, "")])
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(storage.read_all::<Note>(None), Some(vec![Note::new(2, "b")]));
}

#[test]
fn collection_accessor_delegates() {
    let storage = storage();
    let tags = storage.collection::<Tag>();

    tags.insert(&Tag::new("a", "A")).unwrap();
    assert!(tags.insert(&Tag::new("a", "again")).is_err());

    tags.update(&Tag::new("a", "AA")).unwrap();
    assert_eq!(tags.get(&"a".to_string()), Some(Tag::new("a", "AA")));
    assert_eq!(
        tags.find_one(&|t: &Tag| t.label == "AA"),
        Some(Tag::new("a", "AA"))
    );

    tags.save(&Tag::new("b", "B")).unwrap();
    assert_eq!(tags.all().unwrap().len(), 2);

    tags.delete(&Tag::new("a", "")).unwrap();
    assert_eq!(tags.clear().unwrap(), 1);
    assert_eq!(tags.all(), Some(vec![]));
}

#[test]
fn clones_share_the_store() {
    let store = InMemoryStore::new();
    let writer = LocalStorage::new(store.clone());
    let reader = LocalStorage::new(store);

    writer.save(&Note::new(1, "shared")).unwrap();
    assert_eq!(reader.read_by_key::<Note>(&1), Some(Note::new(1, "shared")));
}

#[test]
fn threaded_saves_keep_every_record() {
    let storage = storage();

    let workers: Vec<_> = (0..4u64)
        .map(|worker| {
            let storage = storage.clone();
            std::thread::spawn(move || {
                for i in 0..50u64 {
                    storage.save(&Note::new(worker * 1000 + i, "n")).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(storage.read_all::<Note>(None).unwrap().len(), 200);
}
