use dynamap_core::{item_of, FieldType, MemoryStore, ModelError, RecordRepository, Schema, Value};
use std::sync::Arc;

fn movie_repo(client: Arc<MemoryStore>) -> RecordRepository<MemoryStore> {
    let schema = Schema::builder("movies")
        .field("title", FieldType::String)
        .build();
    client.create_table_for(&schema);
    RecordRepository::new(schema, client)
}

#[test]
fn new_record_starts_empty_and_unpersisted() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let record = repo.new_record();
    assert!(record.attributes().is_empty());
    assert!(!record.persisted());
    assert_eq!(record.primary_key(), None);
}

#[test]
fn writes_to_unknown_attributes_are_dropped() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    record.set("does_not_exist", "x");
    assert!(record.attributes().is_empty());
}

#[test]
fn save_persists_and_marks_the_record() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    record.set("content_id", "v-global");
    record.set("title", "The Secret Life of Walter Mitty");

    repo.save(&mut record).unwrap();
    assert!(record.persisted());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn save_without_primary_key_propagates_generic() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    record.set("title", "Avatar");

    let err = repo.save(&mut record).unwrap_err();
    assert!(matches!(err, ModelError::Generic(_)));
    assert!(!record.persisted());
}

#[test]
fn try_save_reports_generic_failures_as_false() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    record.set("title", "Avatar");

    assert_eq!(repo.try_save(&mut record).unwrap(), false);
    assert!(!record.persisted());

    record.set("content_id", "m-1");
    assert_eq!(repo.try_save(&mut record).unwrap(), true);
    assert!(record.persisted());
}

#[test]
fn presence_validation_aborts_before_any_store_call() {
    let client = Arc::new(MemoryStore::new());
    let repo = movie_repo(client.clone()).validates_presence("title");
    let mut record = repo.new_record();
    record.set("content_id", "m-1");

    let err = repo.save(&mut record).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn create_then_find_roundtrips_exact_attributes() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let attrs = item_of([("content_id", "m-1"), ("title", "Avatar")]);

    let created = repo.create(attrs.clone()).unwrap();
    assert!(created.persisted());

    let found = repo.find_strict("m-1").unwrap();
    assert_eq!(found.attributes(), &attrs);
    assert!(found.persisted());
}

#[test]
fn assign_merges_known_attributes() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    record.assign(item_of([
        ("content_id", Value::from("m-1")),
        ("title", Value::from("Avatar")),
        ("bogus", Value::from("dropped")),
    ]));
    assert_eq!(
        record.attributes(),
        &item_of([("content_id", "m-1"), ("title", "Avatar")])
    );
}

#[test]
fn update_attributes_persists_the_patch() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo
        .create(item_of([("content_id", "m-1"), ("title", "Draft")]))
        .unwrap();

    let saved = repo
        .update_attributes(&mut record, item_of([("title", "Avatar")]))
        .unwrap();
    assert!(saved);

    let found = repo.find_strict("m-1").unwrap();
    assert_eq!(found.get("title"), Some(&Value::from("Avatar")));
}

#[test]
fn delete_removes_remote_item_and_clears_the_key() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo
        .create(item_of([("content_id", "m-delete"), ("title", "Avatar")]))
        .unwrap();

    repo.delete(&mut record).unwrap();
    assert!(!record.persisted());
    assert_eq!(record.primary_key(), None);
    assert_eq!(record.get("title"), Some(&Value::from("Avatar")));
    assert!(repo.find("m-delete").unwrap().is_none());
}

#[test]
fn delete_without_a_primary_key_does_not_fail() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    repo.delete(&mut record).unwrap();
    assert!(!record.persisted());
}

#[test]
fn find_returns_none_for_missing_records() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    assert!(repo.find("no-such-record").unwrap().is_none());
}

#[test]
fn find_strict_signals_record_not_found() {
    let repo = movie_repo(Arc::new(MemoryStore::new()));
    let err = repo.find_strict("no-such-record").unwrap_err();
    assert!(matches!(err, ModelError::RecordNotFound(_)));
}

#[test]
fn count_signals_table_does_not_exist() {
    let schema = Schema::builder("never_created").build();
    let repo = RecordRepository::new(schema, Arc::new(MemoryStore::new()));
    let err = repo.count().unwrap_err();
    assert!(matches!(err, ModelError::TableDoesNotExist(_)));
}

#[test]
fn truncate_deletes_every_item_across_pages() {
    let client = Arc::new(MemoryStore::with_page_size(1));
    let repo = movie_repo(client);
    for id in ["m-1", "m-2", "m-3"] {
        repo.create(item_of([("content_id", id), ("title", "Avatar")]))
            .unwrap();
    }
    assert_eq!(repo.count().unwrap(), 3);

    repo.truncate().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}
