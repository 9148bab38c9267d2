//! Notification presentation keyed by task id.
//!
//! Defines the [`Notifier`] trait for the notification surface. Concrete
//! implementations:
//! - [`console::ConsoleNotifier`] — renders to stdout, for watch mode
//! - [`recording::RecordingNotifier`] — captures calls, for tests
//!
//! Presentation is best-effort throughout: callers log failures and move
//! on, and a reminder that could not be shown is not re-attempted.

pub mod console;
pub mod recording;

use taskbell_model::task::TaskId;

/// Content of a notification to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short heading shown above the body.
    pub title: String,
    /// Main message text.
    pub body: String,
    /// Keep the notification on screen until explicitly dismissed
    /// instead of letting it auto-expire.
    pub require_interaction: bool,
}

/// Errors that can occur when presenting a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The presentation service rejected or failed the request.
    #[error("notification failed: {0}")]
    Failed(String),
}

/// Notification presenter.
///
/// Presenting under an id replaces any notification already shown under
/// that id, so a task never has two notifications on screen.
pub trait Notifier: Send + Sync {
    /// Present `note` under `id`.
    fn present(
        &self,
        id: &TaskId,
        note: Notification,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;

    /// Remove the displayed notification for `id`, reporting whether one
    /// was on screen.
    fn clear(&self, id: &TaskId) -> impl std::future::Future<Output = bool> + Send;
}

impl<N: Notifier> Notifier for std::sync::Arc<N> {
    async fn present(&self, id: &TaskId, note: Notification) -> Result<(), NotifyError> {
        (**self).present(id, note).await
    }

    async fn clear(&self, id: &TaskId) -> bool {
        (**self).clear(id).await
    }
}
