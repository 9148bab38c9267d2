//! Integration tests for reminder delivery: alarm wake → notification.
//!
//! Uses `ManualAlarms` so the firing order and the delete-versus-wake
//! interleavings are fully deterministic.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use taskbell::alarm::manual::ManualAlarms;
use taskbell::notify::recording::RecordingNotifier;
use taskbell::reminder::spawn_reminder_loop;
use taskbell::storage::memory::MemoryStore;
use taskbell::store::{REMINDER_TITLE, TaskStore};
use taskbell_model::task::TaskKind;

use tokio::sync::mpsc;

use taskbell::alarm::AlarmFired;

type Store = TaskStore<MemoryStore, Arc<ManualAlarms>, Arc<RecordingNotifier>>;

struct Stack {
    store: Arc<Store>,
    alarms: Arc<ManualAlarms>,
    notifier: Arc<RecordingNotifier>,
    fired_rx: mpsc::Receiver<AlarmFired>,
}

fn make_stack() -> Stack {
    let (alarms, fired_rx) = ManualAlarms::new(8);
    let alarms = Arc::new(alarms);
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(TaskStore::new(
        MemoryStore::new(),
        Arc::clone(&alarms),
        Arc::clone(&notifier),
    ));
    Stack {
        store,
        alarms,
        notifier,
        fired_rx,
    }
}

fn in_an_hour() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis(),
    )
    .unwrap()
        + 3_600_000
}

/// Runs the wake loop over everything queued so far and waits for it to
/// drain.
async fn drain_wakes(stack: Stack) -> Arc<RecordingNotifier> {
    let handle = spawn_reminder_loop(stack.fired_rx, Arc::clone(&stack.store));
    stack.alarms.close();
    handle.await.unwrap();
    stack.notifier
}

#[tokio::test]
async fn wake_for_live_task_presents_notification_keyed_by_id() {
    let stack = make_stack();
    let task = stack
        .store
        .add("Water the plants", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();

    assert!(stack.alarms.fire(&task.id).await);

    let notifier = drain_wakes(stack).await;
    let presented = notifier.presented();
    assert_eq!(presented.len(), 1);
    assert_eq!(presented[0].0, task.id);
    assert_eq!(presented[0].1.title, REMINDER_TITLE);
    assert_eq!(presented[0].1.body, "Water the plants");
    assert!(presented[0].1.require_interaction);
    assert!(notifier.is_displayed(&task.id));
}

#[tokio::test]
async fn wake_racing_a_delete_is_a_silent_no_op() {
    let stack = make_stack();
    let task = stack
        .store
        .add("Doomed", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();

    // The alarm fires (wake queued) before the delete lands: the
    // cancellation race the wake handler must lose gracefully.
    assert!(stack.alarms.fire(&task.id).await);
    stack.store.remove(&task.id).await.unwrap();

    let notifier = drain_wakes(stack).await;
    assert!(notifier.presented().is_empty());
}

#[tokio::test]
async fn removed_task_never_fires() {
    let stack = make_stack();
    let task = stack
        .store
        .add("Doomed", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();

    // Delete first: the alarm is cancelled, so firing it is refused.
    stack.store.remove(&task.id).await.unwrap();
    assert!(!stack.alarms.fire(&task.id).await);

    let notifier = drain_wakes(stack).await;
    assert!(notifier.presented().is_empty());
}

#[tokio::test]
async fn remove_clears_notification_presented_by_earlier_wake() {
    let stack = make_stack();
    let task = stack
        .store
        .add("Noisy", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();

    stack.store.handle_wake(&task.id).await;
    assert!(stack.notifier.is_displayed(&task.id));

    stack.store.remove(&task.id).await.unwrap();
    assert!(!stack.notifier.is_displayed(&task.id));
}

#[tokio::test]
async fn failed_presentation_is_swallowed_and_loop_continues() {
    let stack = make_stack();
    let first = stack
        .store
        .add("first", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();
    let second = stack
        .store
        .add("second", TaskKind::Reminder, Some(in_an_hour() + 1))
        .await
        .unwrap();

    // First wake is handled while the presenter is down.
    stack.notifier.set_failing(true);
    stack.store.handle_wake(&first.id).await;
    stack.notifier.set_failing(false);

    assert!(stack.alarms.fire(&second.id).await);

    let notifier = drain_wakes(stack).await;
    // Only the second presentation succeeded; nothing was retried.
    let bodies: Vec<_> = notifier
        .presented()
        .into_iter()
        .map(|(_, note)| note.body)
        .collect();
    assert_eq!(bodies, vec!["second".to_string()]);
}

#[tokio::test]
async fn two_reminders_deliver_independently() {
    let stack = make_stack();
    let breakfast = stack
        .store
        .add("breakfast", TaskKind::Reminder, Some(in_an_hour()))
        .await
        .unwrap();
    let lunch = stack
        .store
        .add("lunch", TaskKind::Reminder, Some(in_an_hour() + 1))
        .await
        .unwrap();

    assert!(stack.alarms.fire(&breakfast.id).await);
    assert!(stack.alarms.fire(&lunch.id).await);

    let notifier = drain_wakes(stack).await;
    let presented = notifier.presented();
    assert_eq!(presented.len(), 2);
    assert_eq!(presented[0].0, breakfast.id);
    assert_eq!(presented[1].0, lunch.id);
}
