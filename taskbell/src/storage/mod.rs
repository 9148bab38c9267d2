//! Persistent key/value storage abstraction.
//!
//! Defines the [`KeyValueStore`] trait that all storage backends must
//! satisfy. Concrete implementations:
//! - [`memory::MemoryStore`] — in-process map, for tests and ephemeral use
//! - [`file::JsonFileStore`] — one JSON document on disk
//!
//! Values are opaque [`serde_json::Value`]s; the slot layout is owned by
//! the caller. Every successful write is broadcast to all subscribers as
//! a [`StorageChange`], so observing surfaces converge on the new state
//! without polling.

pub mod file;
pub mod memory;

use serde_json::Value;
use tokio::sync::broadcast;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying persistence service could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A change event delivered to storage subscribers.
#[derive(Debug, Clone)]
pub struct StorageChange {
    /// The key that was written.
    pub key: String,
    /// The full new value under that key.
    pub new_value: Value,
}

/// Async key/value store with a change-subscription feed.
///
/// # Invariant
///
/// A `set` that returns `Ok` has recorded the value before the
/// corresponding [`StorageChange`] is broadcast, so a subscriber that
/// re-reads the key observes the new value or a newer one.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// Returning `Ok` is the persistence acknowledgment.
    fn set(
        &self,
        key: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Subscribe to the change feed.
    ///
    /// Every successful `set` through this backend is delivered to every
    /// subscriber, including subscribers in independently-running
    /// observer loops.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

impl<S: KeyValueStore> KeyValueStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        (**self).subscribe()
    }
}
