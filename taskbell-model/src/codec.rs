//! Storage-slot encoding for the task list.
//!
//! The persisted layout is a single key ([`TASKS_KEY`]) whose value is the
//! JSON array of task records. A slot that was never written (`None` or
//! `null`) decodes to an empty list.

use serde_json::Value;

use crate::task::Task;

/// The storage key under which the task list is persisted.
pub const TASKS_KEY: &str = "tasks";

/// Error type for storage-slot encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The task list could not be serialized.
    #[error("task list encode error: {0}")]
    Encode(#[source] serde_json::Error),
    /// The stored value is not a well-formed task list.
    #[error("task list decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encodes a task list into the storage-slot value.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_tasks(tasks: &[Task]) -> Result<Value, CodecError> {
    serde_json::to_value(tasks).map_err(CodecError::Encode)
}

/// Decodes a storage-slot value back into a task list.
///
/// A missing slot (`None`) and an explicit `null` both mean the list was
/// never written and decode to an empty list.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the value is present but is not a
/// well-formed task list.
pub fn decode_tasks(value: Option<&Value>) -> Result<Vec<Task>, CodecError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(CodecError::Decode),
    }
}
