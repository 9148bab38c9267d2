//! One-shot alarm scheduling keyed by task id.
//!
//! Defines the [`AlarmService`] trait that timer backends must satisfy.
//! Concrete implementations:
//! - [`timer::TokioAlarms`] — real timers on the tokio runtime
//! - [`manual::ManualAlarms`] — fire-on-demand, for deterministic tests
//!
//! Fired alarms are delivered as [`AlarmFired`] values on an mpsc channel
//! handed out at service construction; the reminder wake loop consumes
//! that channel.

pub mod manual;
pub mod timer;

use taskbell_model::task::TaskId;

/// A wake event carrying the id of the alarm that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmFired {
    /// The task id the alarm was registered under.
    pub id: TaskId,
}

/// One-shot timer service.
///
/// An alarm fires at most once, at-or-after its requested instant. An id
/// has at most one pending alarm: scheduling it again replaces the
/// previous registration, and an entry leaves the pending set when it
/// fires or is cancelled.
///
/// Registration and cancellation carry no failure taxonomy: a lost
/// alarm is an absent delivery, not an error.
pub trait AlarmService: Send + Sync {
    /// Register a one-shot alarm for `id` at `when_ms` (epoch millis).
    fn schedule(&self, id: TaskId, when_ms: u64);

    /// Cancel the pending alarm for `id`, reporting whether one was
    /// pending.
    fn cancel(&self, id: &TaskId) -> bool;
}

impl<A: AlarmService> AlarmService for std::sync::Arc<A> {
    fn schedule(&self, id: TaskId, when_ms: u64) {
        (**self).schedule(id, when_ms);
    }

    fn cancel(&self, id: &TaskId) -> bool {
        (**self).cancel(id)
    }
}
