use async_trait::async_trait;

use crate::models::Task;
use crate::transport::ApiResult;

/// Anything that can resolve a task identifier to a fresh snapshot
///
/// Implemented by [`crate::services::TaskService`] over HTTP; tests plug in
/// scripted sources.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    async fn fetch_task_status(&self, task_id: &str) -> ApiResult<Task>;
}
