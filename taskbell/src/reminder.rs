//! Reminder wake loop.
//!
//! Consumes fired alarms and hands each one to the store's wake handler,
//! which resolves the id against the current task list and presents the
//! notification. The loop runs as a spawned background task independent
//! of any frontend and ends when the alarm channel closes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::alarm::{AlarmFired, AlarmService};
use crate::notify::Notifier;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;

/// Runs the wake loop until the alarm channel closes.
///
/// Each wake is handled to completion before the next is taken, matching
/// a platform that serializes alarm deliveries to a single handler.
pub async fn run_reminder_loop<S, A, N>(
    mut fired_rx: mpsc::Receiver<AlarmFired>,
    store: Arc<TaskStore<S, A, N>>,
) where
    S: KeyValueStore,
    A: AlarmService,
    N: Notifier,
{
    while let Some(AlarmFired { id }) = fired_rx.recv().await {
        tracing::debug!(id = %id, "alarm fired");
        store.handle_wake(&id).await;
    }
    tracing::debug!("alarm channel closed; reminder loop exiting");
}

/// Spawns [`run_reminder_loop`] onto the ambient tokio runtime.
pub fn spawn_reminder_loop<S, A, N>(
    fired_rx: mpsc::Receiver<AlarmFired>,
    store: Arc<TaskStore<S, A, N>>,
) -> JoinHandle<()>
where
    S: KeyValueStore + 'static,
    A: AlarmService + 'static,
    N: Notifier + 'static,
{
    tokio::spawn(run_reminder_loop(fired_rx, store))
}
