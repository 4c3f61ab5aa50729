//! Backend task tracking
//!
//! Besides listing and cancelling tasks, [`TaskService`] is the
//! [`TaskStatusSource`] behind the task monitor.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::Listing;
use crate::models::{CancelResult, Task, TaskQuery};
use crate::monitor::{
    MonitorError, MonitorHandle, TaskMonitor, TaskStatusSource, DEFAULT_POLL_INTERVAL,
};
use crate::transport::{ApiClient, ApiError, ApiResult};

#[derive(Clone)]
pub struct TaskService {
    api: Arc<ApiClient>,
    poll_interval: Duration,
}

impl TaskService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Builder method: polling cadence used by [`TaskService::poll_task_status`]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub async fn get_tasks(&self, query: &TaskQuery) -> ApiResult<Vec<Task>> {
        let listing: Listing<Task> = self.api.get_json_with_query("/tasks", query).await?;
        Ok(listing.into_vec())
    }

    pub async fn get_task_status(&self, task_id: &str) -> ApiResult<Task> {
        self.api.get_json(&task_path(task_id)?).await
    }

    /// Ask the backend to stop a running task
    pub async fn cancel_task(&self, task_id: &str) -> ApiResult<CancelResult> {
        tracing::info!(task_id, "Cancelling task");
        self.api.delete_json(&task_path(task_id)?).await
    }

    /// Poll `task_id` until it finishes, calling `on_update` with each snapshot
    pub fn poll_task_status<F>(
        &self,
        task_id: &str,
        on_update: F,
    ) -> Result<MonitorHandle, MonitorError>
    where
        F: FnMut(&Task) + Send + 'static,
    {
        TaskMonitor::new(Arc::new(self.clone()))
            .with_interval(self.poll_interval)
            .start_monitoring(task_id, on_update)
    }
}

#[async_trait]
impl TaskStatusSource for TaskService {
    async fn fetch_task_status(&self, task_id: &str) -> ApiResult<Task> {
        self.get_task_status(task_id).await
    }
}

fn task_path(task_id: &str) -> ApiResult<String> {
    if task_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("task id must not be empty".to_string()));
    }
    Ok(format!("/tasks/{}", urlencoding::encode(task_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_path_encoding() {
        assert_eq!(task_path("abc-123").unwrap(), "/tasks/abc-123");
        assert_eq!(task_path("a/b c").unwrap(), "/tasks/a%2Fb%20c");
        assert!(task_path("").is_err());
    }
}
