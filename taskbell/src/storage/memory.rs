//! In-memory storage backend.
//!
//! Backed by a `HashMap` behind a [`tokio::sync::Mutex`]. Not
//! persistent: all data is lost when the process exits. Mirrors the durable backend's
//! semantics, including the change feed, so tests exercise the same code
//! paths as production.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use super::{KeyValueStore, StorageChange, StorageError};

/// Default capacity of the change broadcast channel.
const DEFAULT_CHANGE_BUFFER: usize = 64;

/// In-process implementation of [`KeyValueStore`].
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_CHANGE_BUFFER);
        Self {
            slots: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.slots
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        // No subscribers is not an error.
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value: value,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
