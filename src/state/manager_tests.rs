//! Tests for StateManager

use super::*;
use crate::error::Error;
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

fn ts(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/test-state.json");
    assert!(!manager.is_in_memory());
    assert_eq!(
        manager.path().and_then(|p| p.to_str()),
        Some("/tmp/test-state.json")
    );
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
    assert!(manager.path().is_none());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"item": "2024-06-01T00:00:00Z"}, "currently_syncing": "item"}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(manager.get_bookmark("item").await.unwrap(), Some(ts(1)));
    assert_eq!(manager.currently_syncing().await.as_deref(), Some("item"));
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_get_set_bookmark() {
    let manager = StateManager::in_memory();
    assert_eq!(manager.get_bookmark("customer").await.unwrap(), None);

    manager.set_bookmark("customer", ts(3)).await.unwrap();
    manager.set_bookmark("item", ts(5)).await.unwrap();
    manager.set_bookmark("customer", ts(4)).await.unwrap();

    assert_eq!(manager.get_bookmark("customer").await.unwrap(), Some(ts(4)));
    assert_eq!(manager.get_bookmark("item").await.unwrap(), Some(ts(5)));
}

#[tokio::test]
async fn test_invalid_bookmark_is_a_state_error() {
    let manager =
        StateManager::from_json(r#"{"bookmarks": {"item": "not a date"}}"#).unwrap();
    let err = manager.get_bookmark("item").await.unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

#[tokio::test]
async fn test_currently_syncing() {
    let manager = StateManager::in_memory();
    assert!(manager.currently_syncing().await.is_none());

    manager.set_currently_syncing(Some("invoice")).await.unwrap();
    assert_eq!(manager.currently_syncing().await.as_deref(), Some("invoice"));

    manager.set_currently_syncing(None).await.unwrap();
    assert!(manager.currently_syncing().await.is_none());
}

#[tokio::test]
async fn test_snapshot_is_a_copy() {
    let manager = StateManager::in_memory();
    manager.set_bookmark("item", ts(1)).await.unwrap();

    let snapshot = manager.snapshot().await;
    manager.set_bookmark("item", ts(2)).await.unwrap();

    assert_eq!(snapshot.bookmark("item"), Some("2024-06-01T00:00:00.000000Z"));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_setters_do_not_touch_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let manager = StateManager::new(&path);

    manager.set_bookmark("item", ts(1)).await.unwrap();
    assert!(!path.exists());

    manager.checkpoint().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_checkpoint_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let manager = StateManager::new(&path);
        manager.set_bookmark("stock_transfer", ts(9)).await.unwrap();
        manager
            .set_currently_syncing(Some("stock_transfer"))
            .await
            .unwrap();
        manager.checkpoint().await.unwrap();
    }

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(
        reloaded.get_bookmark("stock_transfer").await.unwrap(),
        Some(ts(9))
    );
    assert_eq!(
        reloaded.currently_syncing().await.as_deref(),
        Some("stock_transfer")
    );
    assert_eq!(reloaded.path(), Some(path.as_path()));
    assert!(!dir.path().join("state.tmp").exists());
}

#[tokio::test]
async fn test_from_file_missing_starts_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("missing.json")).unwrap();
    assert_eq!(manager.snapshot().await, State::new());
}

#[tokio::test]
async fn test_load_is_read_only() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.json");
    std::fs::write(&input, r#"{"bookmarks": {"item": "2024-06-01"}}"#).unwrap();

    let manager = StateManager::load(&input).unwrap();
    assert!(manager.is_in_memory());
    manager.set_bookmark("item", ts(2)).await.unwrap();
    manager.checkpoint().await.unwrap();

    let on_disk = std::fs::read_to_string(&input).unwrap();
    assert!(on_disk.contains("2024-06-01"));
    assert!(!on_disk.contains("2024-06-02"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = StateManager::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[tokio::test]
async fn test_load_then_write_elsewhere() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    std::fs::write(&input, r#"{"bookmarks": {"item": "2024-06-01T00:00:00Z"}}"#).unwrap();

    let manager = StateManager::load(&input).unwrap().with_output(&output);
    manager.set_bookmark("customer", ts(7)).await.unwrap();
    manager.checkpoint().await.unwrap();

    let written: State =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written.bookmark("item"), Some("2024-06-01T00:00:00Z"));
    assert_eq!(
        written.bookmark("customer"),
        Some("2024-06-07T00:00:00.000000Z")
    );
}

#[tokio::test]
async fn test_checkpoint_in_memory_noop() {
    let manager = StateManager::in_memory();
    manager.set_bookmark("item", ts(1)).await.unwrap();
    manager.checkpoint().await.unwrap();
}

#[tokio::test]
async fn test_load_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not valid json").unwrap();

    let err = StateManager::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

// ============================================================================
// Sharing Tests
// ============================================================================

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone.set_bookmark("item", ts(3)).await.unwrap();
    assert_eq!(manager.get_bookmark("item").await.unwrap(), Some(ts(3)));

    manager.clear().await;
    assert_eq!(clone.snapshot().await, State::new());
}

#[tokio::test]
async fn test_to_json() {
    let manager = StateManager::in_memory();
    manager.set_currently_syncing(Some("item")).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&manager.to_json().await.unwrap()).unwrap();
    assert_eq!(json["currently_syncing"], "item");
    assert_eq!(json["bookmarks"], serde_json::json!({}));
}
