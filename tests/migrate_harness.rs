//! Migrator harness against the fake engine.

mod common;
use common::*;

use serde_json::json;
use simplesearch_backend::migrate::{products_index_definition, MigrateError, Migrator};
use std::path::Path;

fn write_migration(dir: &Path, name: &str, docs: serde_json::Value) {
    std::fs::write(dir.join(name), docs.to_string()).unwrap();
}

fn migrator(engine: &FakeEngine) -> Migrator {
    Migrator::new(&engine_config(&engine.base_url())).unwrap()
}

#[tokio::test]
async fn up_creates_index_and_loads_files_in_order() {
    let engine = FakeEngine::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), "002_more.json", json!([product_source("Gadget", 20.0)]));
    write_migration(
        dir.path(),
        "001_init.json",
        json!([product_source("Widget", 15.0), product_source("Widget XL", 40.0)]),
    );

    let report = migrator(&engine).up(dir.path()).await.unwrap();

    assert!(report.index_created);
    assert_eq!(report.files, 2);
    assert_eq!(report.documents, 3);
    assert_eq!(engine.mapping().await, Some(products_index_definition()));

    let names: Vec<String> = engine
        .documents()
        .await
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Widget", "Widget XL", "Gadget"]);
}

#[tokio::test]
async fn up_keeps_existing_index() {
    let engine = FakeEngine::start().await.unwrap();
    engine.set_index_exists(true).await;
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), "001_init.json", json!([product_source("Widget", 15.0)]));

    let report = migrator(&engine).up(dir.path()).await.unwrap();

    assert!(!report.index_created);
    assert_eq!(report.documents, 1);
    assert_eq!(engine.mapping().await, None);
}

#[tokio::test]
async fn up_rejects_bad_file_before_touching_engine() {
    let engine = FakeEngine::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), "001_init.json", json!({ "name": "Widget" }));

    let err = migrator(&engine).up(dir.path()).await.unwrap_err();

    assert!(matches!(err, MigrateError::InvalidFile { .. }));
    assert!(!engine.index_exists().await);
    assert!(engine.documents().await.is_empty());
}

#[tokio::test]
async fn down_without_flag_only_empties_index() {
    let engine = FakeEngine::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), "001_init.json", json!([product_source("Widget", 15.0)]));

    let migrator = migrator(&engine);
    migrator.up(dir.path()).await.unwrap();
    migrator.down(false).await.unwrap();

    assert!(engine.index_exists().await);
    assert!(engine.documents().await.is_empty());
}

#[tokio::test]
async fn down_with_flag_drops_index() {
    let engine = FakeEngine::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), "001_init.json", json!([product_source("Widget", 15.0)]));

    let migrator = migrator(&engine);
    migrator.up(dir.path()).await.unwrap();
    migrator.down(true).await.unwrap();
    assert!(!engine.index_exists().await);

    // Dropping an index that is already gone is fine.
    migrator.down(true).await.unwrap();
}
