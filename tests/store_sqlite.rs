//! SeaORM store integration tests against SQLite

#![cfg(feature = "sqlite")]

use itemflow::config::DatabaseConfig;
use itemflow::core::items::{ItemDraft, ItemStatus, NewItem};
use itemflow::storage::database::Database;
use itemflow::storage::ItemStore;
use itemflow::utils::error::TrackerError;

fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        // One connection keeps every query on the same in-memory database.
        max_connections: 1,
        connection_timeout: 5,
    }
}

fn new_item(name: &str) -> NewItem {
    ItemDraft {
        name: name.to_string(),
        description: Some("integration fixture".to_string()),
        email: "alice@example.com".to_string(),
        status: None,
    }
    .into_new_item()
}

async fn connect() -> Database {
    let db = Database::new(&memory_config()).await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test]
async fn test_crud_round_trip() {
    let db = connect().await;

    let created = db.insert(&new_item("round trip")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, ItemStatus::Pending);
    assert_eq!(created.version, 1);

    let fetched = db.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let mut updated = fetched.clone();
    updated.status = ItemStatus::Processed;
    let saved = db.save(&updated).await.unwrap();
    assert_eq!(saved.status, ItemStatus::Processed);
    assert_eq!(saved.version, 2);

    db.delete_by_id(created.id).await.unwrap();
    assert!(db.find_by_id(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stale_save_is_rejected() {
    let db = connect().await;
    let created = db.insert(&new_item("contended")).await.unwrap();

    let first_writer = created.clone();
    let second_writer = created.clone();

    let saved = db.save(&first_writer).await.unwrap();
    assert_eq!(saved.version, 2);

    let error = db.save(&second_writer).await.unwrap_err();
    assert!(matches!(error, TrackerError::VersionConflict(_)));

    // The first write survived untouched.
    let stored = db.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn test_save_missing_item_is_not_found() {
    let db = connect().await;

    let mut ghost = db.insert(&new_item("to vanish")).await.unwrap();
    db.delete_by_id(ghost.id).await.unwrap();

    ghost.name = "still ghost".to_string();
    let error = db.save(&ghost).await.unwrap_err();
    assert!(matches!(error, TrackerError::NotFound(_)));
}

#[tokio::test]
async fn test_find_all_orders_by_id() {
    let db = connect().await;

    for name in ["a", "b", "c"] {
        db.insert(&new_item(name)).await.unwrap();
    }

    let all = db.find_all().await.unwrap();
    assert_eq!(all.len(), 3);
    let ids: Vec<i64> = all.iter().map(|item| item.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn test_delete_missing_is_ok() {
    let db = connect().await;
    db.delete_by_id(404).await.unwrap();
}

#[tokio::test]
async fn test_file_backed_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("tracker.db").display());
    let config = DatabaseConfig {
        url,
        max_connections: 2,
        connection_timeout: 5,
    };

    let db = Database::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    let created = db.insert(&new_item("durable")).await.unwrap();
    db.close().await.unwrap();

    let reopened = Database::new(&config).await.unwrap();
    reopened.migrate().await.unwrap();
    let fetched = reopened.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "durable");
}
