//! Asynchronous backend task snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Lifecycle state of a backend task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    /// Some backend workers report "processing" for the same state
    #[serde(alias = "processing")]
    Running,
    Completed,
    Failed,
    /// Any state this client does not recognize; never terminal
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// No further progress is expected once a task reaches this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "running" | "processing" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Read-only snapshot of a backend task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Backend row id
    #[serde(default)]
    pub id: Option<i64>,
    /// Opaque task identifier used for polling
    pub task_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    /// 0-100
    #[serde(default, deserialize_with = "serde_helpers::percent")]
    pub progress: u8,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Task {
    /// Snapshot with the given state, mostly useful for fixtures
    pub fn new(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id: None,
            task_id: task_id.into(),
            task_type: task_type.into(),
            status,
            progress: 0,
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    /// Builder method: set progress (clamped to 100)
    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    /// Builder method: set error message
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// Returned by calls that start a backend job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskReceipt {
    pub task_id: String,
}

/// Result of `DELETE /tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
