//! Task entity types.
//!
//! A [`Task`] is the only persisted entity: a short user-supplied label
//! with an optional one-shot reminder instant. The serde field names are
//! the storage-slot layout and must stay stable across versions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel value of [`Task::reminder_time`] meaning "no reminder".
pub const NO_REMINDER: u64 = 0;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Caller-side task type.
///
/// Only `Reminder` tasks carry an instant. The distinction is collapsed
/// into `reminder_time == 0` when persisted, so it never round-trips
/// through storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// A plain task with no scheduled wake-up.
    Plain,
    /// A task that fires a notification at its reminder instant.
    Reminder,
}

/// A stored task.
///
/// `reminder_time` is milliseconds since epoch, with [`NO_REMINDER`]
/// meaning the task has no reminder. A nonzero value was strictly in the
/// future when the task was created; it is not re-validated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Non-empty user-supplied label.
    pub title: String,
    /// Reminder instant in epoch milliseconds; `0` means no reminder.
    pub reminder_time: u64,
    /// Reserved for a future complete/uncomplete operation. Always
    /// `false` at creation.
    pub completed: bool,
}

impl Task {
    /// Creates a task with a fresh id. `completed` starts `false`.
    #[must_use]
    pub fn new(title: impl Into<String>, reminder_time: u64) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            reminder_time,
            completed: false,
        }
    }

    /// Whether this task carries a reminder.
    #[must_use]
    pub const fn has_reminder(&self) -> bool {
        self.reminder_time != NO_REMINDER
    }
}
