//! Integration tests for the file-backed store and scheduler re-arming.
//!
//! Exercises the full `TaskStore` over `JsonFileStore`, including
//! process-restart shapes: a new store over the same document sees the
//! persisted list, and a fresh scheduling context re-arms only the
//! reminders that are still in the future.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use taskbell::alarm::manual::ManualAlarms;
use taskbell::notify::recording::RecordingNotifier;
use taskbell::storage::file::JsonFileStore;
use taskbell::store::{TaskError, TaskStore};
use taskbell_model::task::{NO_REMINDER, TaskKind};

type Store = TaskStore<JsonFileStore, Arc<ManualAlarms>, Arc<RecordingNotifier>>;

async fn open_store(path: &std::path::Path) -> (Store, Arc<ManualAlarms>) {
    let (alarms, _fired_rx) = ManualAlarms::new(8);
    let alarms = Arc::new(alarms);
    let storage = JsonFileStore::open(path).await.unwrap();
    let store = TaskStore::new(storage, Arc::clone(&alarms), Arc::new(RecordingNotifier::new()));
    (store, alarms)
}

fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis(),
    )
    .unwrap()
}

#[tokio::test]
async fn tasks_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let (store, _) = open_store(&path).await;
    let task = store
        .add("persisted", TaskKind::Reminder, Some(now_ms() + 3_600_000))
        .await
        .unwrap();
    drop(store);

    let (reopened, _) = open_store(&path).await;
    assert_eq!(reopened.load_all().await.unwrap(), vec![task]);
}

#[tokio::test]
async fn remove_in_a_second_session_is_durable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let (store, _) = open_store(&path).await;
    let a = store.add("A", TaskKind::Plain, None).await.unwrap();
    store.add("B", TaskKind::Plain, None).await.unwrap();
    drop(store);

    let (second, _) = open_store(&path).await;
    second.remove(&a.id).await.unwrap();
    drop(second);

    let (third, _) = open_store(&path).await;
    let tasks = third.load_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "B");
}

#[tokio::test]
async fn fresh_context_rearms_future_reminders_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let future_at = now_ms() + 3_600_000;
    let (store, _) = open_store(&path).await;
    let future = store
        .add("future", TaskKind::Reminder, Some(future_at))
        .await
        .unwrap();
    store.add("plain", TaskKind::Plain, None).await.unwrap();
    drop(store);

    // A past-due reminder can exist in storage (it was valid when added);
    // hand-write one to simulate time having passed.
    let raw = std::fs::read_to_string(&path).unwrap();
    let stale = raw.replace(
        &format!("\"reminderTime\": {future_at}"),
        "\"reminderTime\": 1000",
    );
    let stale_path = dir.path().join("stale.json");
    std::fs::write(&stale_path, stale).unwrap();

    let (fresh, alarms) = open_store(&path).await;
    assert_eq!(alarms.pending_len(), 0);

    let armed = fresh.reschedule_pending().await.unwrap();
    assert_eq!(armed, 1);
    assert_eq!(alarms.scheduled_at(&future.id), Some(future_at));

    // The document with the stale instant arms nothing.
    let (stale_store, stale_alarms) = open_store(&stale_path).await;
    assert_eq!(stale_store.reschedule_pending().await.unwrap(), 0);
    assert_eq!(stale_alarms.pending_len(), 0);
}

#[tokio::test]
async fn empty_document_loads_as_no_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = open_store(&dir.path().join("tasks.json")).await;
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn persisted_records_use_the_storage_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let (store, _) = open_store(&path).await;
    store.add("named", TaskKind::Plain, None).await.unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let record = &document["tasks"][0];
    assert!(record["id"].is_string());
    assert_eq!(record["title"], "named");
    assert_eq!(record["reminderTime"], NO_REMINDER);
    assert_eq!(record["completed"], false);
}

#[tokio::test]
async fn corrupt_document_surfaces_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonFileStore::open(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unwritable_target_fails_the_command_not_the_process() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let (store, alarms) = open_store(&path).await;
    // A directory where the document file should be makes writes fail.
    std::fs::create_dir(&path).unwrap();
    let err = store
        .add("doomed", TaskKind::Reminder, Some(now_ms() + 3_600_000))
        .await
        .unwrap_err();

    assert!(matches!(err, TaskError::Storage(_)));
    assert_eq!(alarms.pending_len(), 0);
}
