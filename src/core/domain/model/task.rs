//! Domain model for director tasks from the `/tasks/{id}` endpoint.
//!
//! A task is an asynchronous unit of work owned by the director. The client
//! only ever observes snapshots of it by fetching the resource again.

use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// A snapshot of a director task.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Task {
    /// Task identifier.
    pub id: u64,
    /// Current state as reported by the director.
    pub state: TaskState,
    /// Free-text description (e.g., "retrieve vm-stats").
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub description: String,
    /// Creation time.
    #[serde(with = "serde_helpers::system_time")]
    pub timestamp: SystemTime,
    /// Short result summary, set once the task is terminal.
    #[serde(default)]
    pub result: Option<String>,
    /// User that started the task.
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub user: String,
}

/// The lifecycle state of a task.
///
/// Values the client does not know are kept in [`TaskState::Other`] and are
/// treated as terminal failures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Queued,
    Processing,
    Done,
    Error,
    Cancelled,
    Timeout,
    Other(String),
}

impl TaskState {
    /// Returns `true` while the director is still working on the task.
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Queued | TaskState::Processing)
    }

    /// Returns `true` if the task finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, TaskState::Done)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Processing => "processing",
            TaskState::Done => "done",
            TaskState::Error => "error",
            TaskState::Cancelled => "cancelled",
            TaskState::Timeout => "timeout",
            TaskState::Other(state) => state,
        }
    }
}

impl From<String> for TaskState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => TaskState::Queued,
            "processing" => TaskState::Processing,
            "done" => TaskState::Done,
            "error" => TaskState::Error,
            "cancelled" => TaskState::Cancelled,
            "timeout" => TaskState::Timeout,
            _ => TaskState::Other(value),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
