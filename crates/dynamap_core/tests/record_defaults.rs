use dynamap_core::{
    item_of, FieldType, MemoryStore, RecordRepository, Schema, Value, CREATED_AT, UPDATED_AT,
};
use std::sync::Arc;
use uuid::Uuid;

fn token_repo(client: Arc<MemoryStore>) -> RecordRepository<MemoryStore> {
    let schema = Schema::builder("access_tokens")
        .primary_key("token")
        .field("tenant_id", FieldType::String)
        .field_with_default("active", FieldType::Boolean, || Value::from(true))
        .field_with_default("token_type", FieldType::String, || Value::from("EMBED"))
        .field_with_default("device_class", FieldType::String, || {
            Value::from("BROWSER")
        })
        .field_with_default("payload", FieldType::Map, Value::empty_map)
        .index("tenant_id_index", "tenant_id")
        .build();
    client.create_table_for(&schema);
    RecordRepository::new(schema, client).before_create(|record| {
        if record.get("token").map_or(true, Value::is_null) {
            record.set("token", Uuid::new_v4().simple().to_string());
        }
    })
}

#[test]
fn defaults_are_applied_to_new_records() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    let record = repo.new_record();
    assert_eq!(record.get("active"), Some(&Value::from(true)));
    assert_eq!(record.get("token_type"), Some(&Value::from("EMBED")));
    assert_eq!(record.get("device_class"), Some(&Value::from("BROWSER")));
}

#[test]
fn explicit_attributes_win_over_defaults() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    let record = repo.build(item_of([("active", false)]));
    assert_eq!(record.get("active"), Some(&Value::from(false)));
    assert_eq!(record.get("token_type"), Some(&Value::from("EMBED")));
}

#[test]
fn map_defaults_are_fresh_per_record() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    let mut first = repo.new_record();
    let second = repo.new_record();

    first.set(
        "payload",
        Value::Map(item_of([("origin", "https://example.com")])),
    );
    assert_eq!(second.get("payload"), Some(&Value::empty_map()));
}

#[test]
fn flag_coerces_presence_of_boolean_fields() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.new_record();
    assert!(record.flag("active"));

    record.set("active", false);
    assert!(!record.flag("active"));

    // Only declared boolean fields answer through the flag accessor.
    record.set("tenant_id", "u-1");
    assert!(!record.flag("tenant_id"));
    assert!(!record.flag("does_not_exist"));
}

#[test]
fn before_create_fills_the_token_only_when_absent() {
    let repo = token_repo(Arc::new(MemoryStore::new()));

    let generated = repo.create(item_of([("tenant_id", "u-1")])).unwrap();
    let token = generated
        .primary_key()
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap();
    assert_eq!(token.len(), 32);

    let explicit = repo
        .create(item_of([("token", "fixed-token"), ("tenant_id", "u-1")]))
        .unwrap();
    assert_eq!(explicit.primary_key(), Some(&Value::from("fixed-token")));
}

#[test]
fn create_hooks_do_not_rerun_on_subsequent_saves() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    let mut record = repo.create(item_of([("tenant_id", "u-1")])).unwrap();
    let token = record.primary_key().cloned().unwrap();

    repo.save(&mut record).unwrap();
    assert_eq!(record.primary_key(), Some(&token));
}

#[test]
fn autogenerated_primary_keys_are_uuids() {
    let client = Arc::new(MemoryStore::new());
    let schema = Schema::builder("movies")
        .field("title", FieldType::String)
        .build();
    client.create_table_for(&schema);
    let repo = RecordRepository::new(schema, client).autogenerate_primary_key();

    let record = repo.create(item_of([("title", "Avatar")])).unwrap();
    let id = record.primary_key().and_then(Value::as_str).unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[test]
fn timestamps_are_set_on_create_and_touched_on_save() {
    let client = Arc::new(MemoryStore::new());
    let schema = Schema::builder("notes")
        .field("body", FieldType::String)
        .timestamps()
        .build();
    client.create_table_for(&schema);
    let repo = RecordRepository::new(schema, client)
        .autogenerate_primary_key()
        .track_timestamps();

    let mut record = repo.create(item_of([("body", "first")])).unwrap();
    let created = record.get(CREATED_AT).and_then(Value::as_i64).unwrap();
    let updated = record.get(UPDATED_AT).and_then(Value::as_i64).unwrap();
    assert!(created > 0);
    assert!(updated >= created);

    repo.update_attributes(&mut record, item_of([("body", "second")]))
        .unwrap();
    assert_eq!(
        record.get(CREATED_AT).and_then(Value::as_i64),
        Some(created)
    );
    assert!(record.get(UPDATED_AT).and_then(Value::as_i64).unwrap() >= updated);
}

#[test]
fn where_eq_on_the_repository_starts_a_query_chain() {
    let repo = token_repo(Arc::new(MemoryStore::new()));
    repo.create(item_of([("tenant_id", "u-1")])).unwrap();
    repo.create(item_of([
        ("tenant_id", Value::from("u-1")),
        ("active", Value::from(false)),
    ]))
    .unwrap();
    repo.create(item_of([("tenant_id", "u-2")])).unwrap();

    let all = repo
        .where_eq("tenant_id", "u-1")
        .index("tenant_id_index")
        .to_vec()
        .unwrap();
    assert_eq!(all.len(), 2);

    let active = repo
        .where_eq("tenant_id", "u-1")
        .index("tenant_id_index")
        .where_eq("active", true)
        .to_vec()
        .unwrap();
    assert_eq!(active.len(), 1);
    assert!(active[0].flag("active"));
}
