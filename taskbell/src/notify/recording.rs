//! Call-recording notifier for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use taskbell_model::task::TaskId;

use super::{Notification, Notifier, NotifyError};

/// [`Notifier`] that records every presentation for later assertions.
///
/// Can be switched into a failing mode to exercise the best-effort
/// handling of presentation errors.
pub struct RecordingNotifier {
    presented: Mutex<Vec<(TaskId, Notification)>>,
    displayed: Mutex<HashSet<TaskId>>,
    should_fail: AtomicBool,
}

impl RecordingNotifier {
    /// Creates a recording notifier that accepts every presentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            presented: Mutex::new(Vec::new()),
            displayed: Mutex::new(HashSet::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `present` calls fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Every successful presentation so far, in order.
    #[must_use]
    pub fn presented(&self) -> Vec<(TaskId, Notification)> {
        self.presented.lock().clone()
    }

    /// Whether a notification is currently on screen for `id`.
    #[must_use]
    pub fn is_displayed(&self, id: &TaskId) -> bool {
        self.displayed.lock().contains(id)
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    async fn present(&self, id: &TaskId, note: Notification) -> Result<(), NotifyError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Failed("presenter offline".to_string()));
        }
        self.presented.lock().push((id.clone(), note));
        self.displayed.lock().insert(id.clone());
        Ok(())
    }

    async fn clear(&self, id: &TaskId) -> bool {
        self.displayed.lock().remove(id)
    }
}
