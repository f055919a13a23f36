use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a task routed through the manager
///
/// Two tasks are equal when their ids are equal, so a worker can report
/// completion with a copy of the task it was handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: String,

    /// Task payload containing type and data
    pub payload: TaskPayload,

    /// Task creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Task payload containing the actual work to be done
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    /// Type of task (used for routing to appropriate handler)
    pub task_type: String,

    /// Task data as JSON
    pub data: serde_json::Value,
}

impl Task {
    /// Create a new task with the given payload
    pub fn new(payload: TaskPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            created_at: Utc::now(),
        }
    }

    /// Create a task with a caller-chosen id
    pub fn with_id(id: impl Into<String>, payload: TaskPayload) -> Self {
        Self {
            id: id.into(),
            payload,
            created_at: Utc::now(),
        }
    }

    /// Get task age in seconds
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }

    /// Encode the task as JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a task from JSON
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl TaskPayload {
    /// Create a new task payload
    pub fn new(task_type: String, data: serde_json::Value) -> Self {
        Self { task_type, data }
    }
}
