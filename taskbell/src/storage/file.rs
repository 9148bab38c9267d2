//! File-backed storage: one JSON document holding the key/value map.
//!
//! The document is a single JSON object mapping keys to their stored
//! values. Every `set` re-reads the document, replaces the one key, and
//! rewrites the whole file before broadcasting the change. A missing file
//! reads as an empty document.
//!
//! The change feed covers subscribers of this handle (and clones of it via
//! `Arc`); the file is not watched for writes made by other processes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::{Mutex, broadcast};

use super::{KeyValueStore, StorageChange, StorageError};

/// Default capacity of the change broadcast channel.
const DEFAULT_CHANGE_BUFFER: usize = 64;

/// [`KeyValueStore`] persisted as one JSON document on disk.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileStore {
    /// Opens the store at `path`, validating any existing document.
    ///
    /// A file that does not exist yet is fine; it is created by the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if an existing document
    /// cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        read_document(&path).await?;
        let (changes, _) = broadcast::channel(DEFAULT_CHANGE_BUFFER);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            changes,
        })
    }

    /// The path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads and parses the document, treating a missing file as empty.
async fn read_document(path: &Path) -> Result<BTreeMap<String, Value>, StorageError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StorageError::Unavailable(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };
    serde_json::from_str(&contents).map_err(|e| {
        StorageError::Unavailable(format!("corrupt document {}: {e}", path.display()))
    })
}

/// Writes the document, creating parent directories as needed.
async fn write_document(path: &Path, doc: &BTreeMap<String, Value>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    let contents = serde_json::to_string_pretty(doc)
        .map_err(|e| StorageError::Unavailable(format!("cannot serialize document: {e}")))?;
    tokio::fs::write(path, contents).await.map_err(|e| {
        StorageError::Unavailable(format!("cannot write {}: {e}", path.display()))
    })
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(read_document(&self.path).await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let guard = self.write_lock.lock().await;
        let mut doc = read_document(&self.path).await?;
        doc.insert(key.to_string(), value.clone());
        write_document(&self.path, &doc).await?;
        drop(guard);

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
