//! The task store — single source of truth for the task list.
//!
//! All mutations are read-modify-write sequences against one storage
//! slot. The store is generic over its three collaborators (storage,
//! alarms, notifier) so each can be substituted with a fake in tests.
//!
//! # Single-writer assumption
//!
//! Read-current → mutate → write-back is not guarded against concurrent
//! writers. The event model this store is built for runs one mutation
//! callback at a time; a deployment with truly concurrent writers would
//! need a compare-and-swap discipline on the slot.

use std::time::{SystemTime, UNIX_EPOCH};

use taskbell_model::codec::{self, CodecError, TASKS_KEY};
use taskbell_model::task::{NO_REMINDER, Task, TaskId, TaskKind};

use crate::alarm::AlarmService;
use crate::feed::TaskFeed;
use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, StorageError};

/// Heading used for every reminder notification.
pub const REMINDER_TITLE: &str = "Task reminder";

/// Errors surfaced by task store commands.
///
/// Every variant renders as one human-readable line; the command boundary
/// shows it and leaves the list untouched.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// A reminder task was requested without an instant.
    #[error("missing reminder time")]
    ReminderMissing,
    /// The requested reminder instant is not strictly in the future.
    #[error("reminder time is in the past")]
    ReminderInPast,
    /// The persistence layer failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The persisted slot could not be interpreted.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Store for the persisted task list.
///
/// `S` is the persistent key/value backend, `A` the one-shot alarm
/// service, `N` the notification presenter.
pub struct TaskStore<S, A, N> {
    storage: S,
    alarms: A,
    notifier: N,
}

impl<S, A, N> TaskStore<S, A, N>
where
    S: KeyValueStore,
    A: AlarmService,
    N: Notifier,
{
    /// Creates a store over the given collaborators.
    pub const fn new(storage: S, alarms: A, notifier: N) -> Self {
        Self {
            storage,
            alarms,
            notifier,
        }
    }

    /// Returns the current timestamp in milliseconds since epoch.
    fn now_ms() -> u64 {
        u64::try_from(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
        )
        .unwrap_or(u64::MAX)
    }

    /// Returns the persisted task list, or an empty list if the slot was
    /// never written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Storage`] if the backend cannot be read, or
    /// [`TaskError::Codec`] if the slot holds something that is not a
    /// task list.
    pub async fn load_all(&self) -> Result<Vec<Task>, TaskError> {
        let slot = self.storage.get(TASKS_KEY).await?;
        Ok(codec::decode_tasks(slot.as_ref())?)
    }

    /// Creates a task and appends it to the persisted list.
    ///
    /// For `TaskKind::Reminder`, `reminder_at` must be a strictly-future
    /// epoch-millis instant; the task's alarm is registered only after
    /// the list write is acknowledged, so an alarm can never fire for a
    /// task that was not persisted. Validation failures leave the list
    /// untouched and register no alarm.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TitleEmpty`], [`TaskError::ReminderMissing`],
    /// or [`TaskError::ReminderInPast`] on invalid input, and
    /// [`TaskError::Storage`] if the write-back fails.
    pub async fn add(
        &self,
        title: &str,
        kind: TaskKind,
        reminder_at: Option<u64>,
    ) -> Result<Task, TaskError> {
        if title.is_empty() {
            return Err(TaskError::TitleEmpty);
        }
        let reminder_time = match kind {
            TaskKind::Plain => NO_REMINDER,
            TaskKind::Reminder => {
                let at = reminder_at.ok_or(TaskError::ReminderMissing)?;
                if at <= Self::now_ms() {
                    return Err(TaskError::ReminderInPast);
                }
                at
            }
        };

        let task = Task::new(title, reminder_time);
        let mut tasks = self.load_all().await?;
        tasks.push(task.clone());
        self.write_back(&tasks).await?;

        if task.has_reminder() {
            self.alarms.schedule(task.id.clone(), task.reminder_time);
        }
        tracing::debug!(id = %task.id, reminder = task.reminder_time, "task added");
        Ok(task)
    }

    /// Removes the task with the given id from the persisted list.
    ///
    /// An absent id is a no-op, not an error. The pending alarm and any
    /// displayed notification under the id are removed best-effort after
    /// the list write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Storage`] only if the write-back fails.
    pub async fn remove(&self, id: &TaskId) -> Result<(), TaskError> {
        let mut tasks = self.load_all().await?;
        tasks.retain(|t| t.id != *id);
        self.write_back(&tasks).await?;

        if self.alarms.cancel(id) {
            tracing::debug!(id = %id, "pending alarm cancelled");
        }
        if self.notifier.clear(id).await {
            tracing::debug!(id = %id, "displayed notification cleared");
        }
        Ok(())
    }

    /// Handles one alarm wake: resolve the id against the current list
    /// and present the task's reminder notification.
    ///
    /// An id with no matching task is the deleted-while-pending race and
    /// is silently dropped. Read and presentation failures are logged and
    /// dropped; reminders are not re-attempted.
    pub async fn handle_wake(&self, id: &TaskId) {
        let tasks = match self.load_all().await {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "cannot load tasks for fired alarm");
                return;
            }
        };

        let Some(task) = tasks.iter().find(|t| t.id == *id) else {
            tracing::debug!(id = %id, "fired alarm has no matching task; ignoring");
            return;
        };

        let note = Notification {
            title: REMINDER_TITLE.to_string(),
            body: task.title.clone(),
            require_interaction: true,
        };
        if let Err(err) = self.notifier.present(id, note).await {
            tracing::warn!(id = %id, error = %err, "reminder notification not presented");
        }
    }

    /// Re-registers alarms for every persisted task whose reminder
    /// instant is still in the future, returning how many were armed.
    ///
    /// Used when a scheduling context starts after tasks were persisted
    /// by earlier runs. Instants already reached are skipped; a missed
    /// reminder is not delivered late.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Storage`] if the list cannot be read.
    pub async fn reschedule_pending(&self) -> Result<usize, TaskError> {
        let now = Self::now_ms();
        let mut armed = 0;
        for task in self.load_all().await? {
            if task.reminder_time > now {
                self.alarms.schedule(task.id.clone(), task.reminder_time);
                armed += 1;
            }
        }
        Ok(armed)
    }

    /// Subscribes to the task list change feed.
    pub fn subscribe(&self) -> TaskFeed {
        TaskFeed::new(self.storage.subscribe())
    }

    async fn write_back(&self, tasks: &[Task]) -> Result<(), TaskError> {
        let value = codec::encode_tasks(tasks)?;
        self.storage.set(TASKS_KEY, value).await?;
        Ok(())
    }
}
