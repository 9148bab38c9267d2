//! Stdout notification rendering.

use std::collections::HashSet;

use parking_lot::Mutex;

use taskbell_model::task::TaskId;

use super::{Notification, Notifier, NotifyError};

/// Renders notifications to standard output, one block per notification.
///
/// A terminal has no real dismissal surface, so `clear` only forgets the
/// id, and `require_interaction` renders as a dismissal hint instead of
/// controlling on-screen lifetime.
pub struct ConsoleNotifier {
    displayed: Mutex<HashSet<TaskId>>,
}

impl ConsoleNotifier {
    /// Creates a console notifier with nothing displayed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            displayed: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    async fn present(&self, id: &TaskId, note: Notification) -> Result<(), NotifyError> {
        println!("\u{1f514} {}: {}", note.title, note.body);
        if note.require_interaction {
            println!("   (remove the task to dismiss: taskbell remove {id})");
        }
        tracing::info!(id = %id, body = %note.body, "notification presented");
        self.displayed.lock().insert(id.clone());
        Ok(())
    }

    async fn clear(&self, id: &TaskId) -> bool {
        self.displayed.lock().remove(id)
    }
}
