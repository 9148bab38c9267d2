//! Tokio-backed alarm timers.
//!
//! Each registration spawns a sleeping task; a registry keeps the join
//! handle so cancellation can abort it. A fired alarm removes its own
//! registry entry before delivering, so the pending set never contains an
//! alarm that has already fired.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use taskbell_model::task::TaskId;

use super::{AlarmFired, AlarmService};

/// Default capacity of the fired-alarm channel.
pub const DEFAULT_FIRE_BUFFER: usize = 64;

/// [`AlarmService`] backed by `tokio::time` timers.
///
/// Must be created inside a tokio runtime; `schedule` spawns onto the
/// ambient runtime.
pub struct TokioAlarms {
    pending: Arc<Mutex<HashMap<TaskId, JoinHandle<()>>>>,
    fired_tx: mpsc::Sender<AlarmFired>,
}

impl TokioAlarms {
    /// Creates the service and the receiving end of its wake channel.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AlarmFired>) {
        let (fired_tx, fired_rx) = mpsc::channel(buffer);
        (
            Self {
                pending: Arc::new(Mutex::new(HashMap::new())),
                fired_tx,
            },
            fired_rx,
        )
    }

    /// Number of alarms currently pending.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Current time in milliseconds since epoch.
fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}

impl AlarmService for TokioAlarms {
    fn schedule(&self, id: TaskId, when_ms: u64) {
        // An instant already reached maps to a zero delay: fire "soon
        // after due time", never early.
        let delay = Duration::from_millis(when_ms.saturating_sub(now_ms()));
        let pending = Arc::clone(&self.pending);
        let tx = self.fired_tx.clone();
        let fired_id = id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.lock().remove(&fired_id);
            if tx.send(AlarmFired { id: fired_id }).await.is_err() {
                tracing::debug!("wake channel closed; dropping fired alarm");
            }
        });

        if let Some(previous) = self.pending.lock().insert(id, handle) {
            previous.abort();
        }
    }

    fn cancel(&self, id: &TaskId) -> bool {
        match self.pending.lock().remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
