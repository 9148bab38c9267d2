//! Store-change propagation.
//!
//! Wraps the storage backend's raw change feed and yields the decoded new
//! task list whenever the tasks slot changes. Observing surfaces
//! re-render from pushed lists instead of polling the store.

use tokio::sync::broadcast;

use taskbell_model::codec::{self, TASKS_KEY};
use taskbell_model::task::Task;

use crate::storage::StorageChange;

/// A subscription to task list changes.
///
/// Obtained from [`TaskStore::subscribe`](crate::store::TaskStore::subscribe).
/// Each delivered list is the full current state, so an observer that
/// misses intermediate states resynchronizes on the next change.
pub struct TaskFeed {
    rx: broadcast::Receiver<StorageChange>,
}

impl TaskFeed {
    pub(crate) const fn new(rx: broadcast::Receiver<StorageChange>) -> Self {
        Self { rx }
    }

    /// Waits for the next change to the task slot and returns the new
    /// full list.
    ///
    /// Changes to other storage keys are skipped. Returns `None` once the
    /// feed is closed (the store was dropped).
    pub async fn next(&mut self) -> Option<Vec<Task>> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == TASKS_KEY => {
                    match codec::decode_tasks(Some(&change.new_value)) {
                        Ok(tasks) => return Some(tasks),
                        Err(err) => {
                            tracing::warn!(error = %err, "undecodable task list on change feed");
                        }
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "change feed lagged; waiting for next full state");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
