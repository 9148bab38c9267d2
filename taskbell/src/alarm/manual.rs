//! Fire-on-demand alarms for tests.
//!
//! Records registrations without arming any real timer; test code decides
//! when an alarm fires by calling [`ManualAlarms::fire`]. This makes the
//! delete-versus-wake interleavings deterministic to exercise.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use taskbell_model::task::TaskId;

use super::{AlarmFired, AlarmService};

/// [`AlarmService`] whose alarms only fire when test code says so.
pub struct ManualAlarms {
    pending: Mutex<HashMap<TaskId, u64>>,
    fired_tx: Mutex<Option<mpsc::Sender<AlarmFired>>>,
}

impl ManualAlarms {
    /// Creates the service and the receiving end of its wake channel.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AlarmFired>) {
        let (fired_tx, fired_rx) = mpsc::channel(buffer);
        (
            Self {
                pending: Mutex::new(HashMap::new()),
                fired_tx: Mutex::new(Some(fired_tx)),
            },
            fired_rx,
        )
    }

    /// Closes the wake channel, letting any loop draining it run dry.
    pub fn close(&self) {
        self.fired_tx.lock().take();
    }

    /// The instant `id` is registered for, if pending.
    #[must_use]
    pub fn scheduled_at(&self, id: &TaskId) -> Option<u64> {
        self.pending.lock().get(id).copied()
    }

    /// Number of alarms currently pending.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Fires the pending alarm for `id`, delivering its wake event.
    ///
    /// Returns `false` without delivering anything if no alarm is pending
    /// for `id`; a cancelled alarm never fires, matching the platform
    /// contract.
    pub async fn fire(&self, id: &TaskId) -> bool {
        if self.pending.lock().remove(id).is_none() {
            return false;
        }
        let tx = self.fired_tx.lock().clone();
        match tx {
            Some(tx) => tx.send(AlarmFired { id: id.clone() }).await.is_ok(),
            None => false,
        }
    }
}

impl AlarmService for ManualAlarms {
    fn schedule(&self, id: TaskId, when_ms: u64) {
        self.pending.lock().insert(id, when_ms);
    }

    fn cancel(&self, id: &TaskId) -> bool {
        self.pending.lock().remove(id).is_some()
    }
}
