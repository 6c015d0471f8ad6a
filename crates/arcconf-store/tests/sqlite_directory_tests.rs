#![allow(clippy::unwrap_used, clippy::expect_used)]

// Reconciliation against the SQLite directory store

use arcconf_core::apply::apply_plan;
use arcconf_core::changelog::Verbosity;
use arcconf_core::directory::DirectoryStore;
use arcconf_core::load::load_snapshot;
use arcconf_core::model::{AttributeSet, Entity};
use arcconf_core::path::Path;
use arcconf_core::reconcile::reconcile;
use arcconf_core::schema::Schema;
use arcconf_core::value::Value;
use arcconf_store::SqliteDirectory;

fn device_path() -> Path {
    Path::parse("dicomDeviceName=arc").unwrap()
}

fn desired(schema: &Schema, retries: i64) -> Entity {
    let storage = Entity::new(schema.entity_type("storage").unwrap().clone())
        .with("storageId", "fs1")
        .unwrap()
        .with("uri", "file:///storage/fs1")
        .unwrap()
        .with("storageThreshold", "5GB")
        .unwrap()
        .with("properties", Value::properties([("pathFormat", "{now,date,yyyy/MM/dd}")]))
        .unwrap();
    let queue = Entity::new(schema.entity_type("queue").unwrap().clone())
        .with("queueName", "Export1")
        .unwrap()
        .with("maxRetries", retries)
        .unwrap();
    Entity::new(schema.root().clone())
        .with("overwritePolicy", "SAME_SOURCE_AND_SERIES")
        .unwrap()
        .with_child("storages", storage)
        .unwrap()
        .with_child("queues", queue)
        .unwrap()
}

#[test]
fn test_applied_plan_reloads_as_desired() {
    // GIVEN a provisioned device in a SQLite store
    let schema = Schema::archive().unwrap();
    let mut store = SqliteDirectory::open_in_memory().unwrap();
    store
        .create_subtree(&device_path(), &AttributeSet::new())
        .unwrap();

    // WHEN the archive extension is attached
    let curr = desired(&schema, 2);
    let plan = reconcile(&device_path(), None, Some(&curr), Verbosity::Summary).unwrap();
    assert_eq!(apply_plan(&mut store, &plan).unwrap(), 3);

    // THEN loading gives back the desired snapshot
    let loaded = load_snapshot(&store, &device_path(), schema.root())
        .unwrap()
        .unwrap();
    assert!(loaded.skipped.is_empty());
    assert_eq!(loaded.entity, curr);

    // AND an update only touches the changed queue
    let next = desired(&schema, 5);
    let plan = reconcile(&device_path(), Some(&curr), Some(&next), Verbosity::Verbose).unwrap();
    assert_eq!(plan.ops.len(), 1);
    store.apply_atomically(&plan).unwrap();
    let loaded = load_snapshot(&store, &device_path(), schema.root())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.entity, next);
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("arcconf.db");
    let schema = Schema::archive().unwrap();
    let curr = desired(&schema, 1);

    {
        let mut store = SqliteDirectory::open(&db).unwrap();
        store
            .create_subtree(&device_path(), &AttributeSet::new())
            .unwrap();
        let plan = reconcile(&device_path(), None, Some(&curr), Verbosity::Summary).unwrap();
        store.apply_atomically(&plan).unwrap();
    }

    let store = SqliteDirectory::open(&db).unwrap();
    let loaded = load_snapshot(&store, &device_path(), schema.root())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.entity, curr);
}

#[test]
fn test_teardown_leaves_bare_device() {
    let schema = Schema::archive().unwrap();
    let mut store = SqliteDirectory::open_in_memory().unwrap();
    store
        .create_subtree(&device_path(), &AttributeSet::new())
        .unwrap();
    let curr = desired(&schema, 1);
    let plan = reconcile(&device_path(), None, Some(&curr), Verbosity::Summary).unwrap();
    store.apply_atomically(&plan).unwrap();

    let teardown = reconcile(&device_path(), Some(&curr), None, Verbosity::Summary).unwrap();
    store.apply_atomically(&teardown).unwrap();

    assert_eq!(store.len().unwrap(), 1);
    assert!(store.read(&device_path()).unwrap().unwrap().is_empty());
    assert!(load_snapshot(&store, &device_path(), schema.root())
        .unwrap()
        .is_none());
}
