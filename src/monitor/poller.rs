//! Task Poller
//!
//! Each call to [`TaskMonitor::start_monitoring`] spawns one tokio task that
//! ticks on a fixed interval, fetches the task snapshot and hands it to the
//! caller's callback. The loop ends on a terminal status, on the first fetch
//! failure, or when the handle is cancelled.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::source::TaskStatusSource;
use crate::models::{Task, TaskStatus};
use crate::transport::ApiError;

/// Default polling cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Why a subscription stopped
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    /// Last snapshot reported `completed`
    Completed(Task),
    /// Last snapshot reported `failed`
    Failed(Task),
    /// A status fetch failed; polling was abandoned without retry
    FetchFailed(ApiError),
    /// The handle was cancelled
    Cancelled,
    /// The polling task panicked (usually inside the callback)
    Aborted,
}

impl MonitorOutcome {
    /// The final snapshot, when the task itself reached a terminal state
    pub fn task(&self) -> Option<&Task> {
        match self {
            MonitorOutcome::Completed(task) | MonitorOutcome::Failed(task) => Some(task),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MonitorOutcome::Completed(_))
    }
}

/// Rejected monitor arguments
#[derive(Debug, Error, PartialEq)]
pub enum MonitorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Starts poll subscriptions against a [`TaskStatusSource`]
#[derive(Clone)]
pub struct TaskMonitor {
    source: Arc<dyn TaskStatusSource>,
    interval: Duration,
}

impl TaskMonitor {
    pub fn new(source: Arc<dyn TaskStatusSource>) -> Self {
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Builder method: set the polling cadence (minimum 1 ms)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `task_id`, invoking `on_update` with every snapshot
    ///
    /// The first fetch happens one interval from now. Must be called from
    /// within a tokio runtime.
    pub fn start_monitoring<F>(
        &self,
        task_id: &str,
        on_update: F,
    ) -> Result<MonitorHandle, MonitorError>
    where
        F: FnMut(&Task) + Send + 'static,
    {
        if task_id.trim().is_empty() {
            return Err(MonitorError::InvalidArgument("task id must not be empty".to_string()));
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let first_tick = Instant::now() + self.interval;

        let join = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            task_id.to_string(),
            first_tick,
            self.interval,
            stop_rx,
            on_update,
        ));

        tracing::debug!(
            task_id,
            interval_ms = self.interval.as_millis() as u64,
            "Task monitoring started"
        );

        Ok(MonitorHandle {
            canceller: Canceller {
                task_id: Arc::from(task_id),
                stop: Arc::new(stop_tx),
            },
            join,
        })
    }
}

/// Owner of one poll subscription
///
/// Dropping the handle detaches the subscription: polling continues until
/// the task reaches a terminal state or a fetch fails.
pub struct MonitorHandle {
    canceller: Canceller,
    join: JoinHandle<MonitorOutcome>,
}

impl MonitorHandle {
    pub fn task_id(&self) -> &str {
        &self.canceller.task_id
    }

    /// Stop polling; safe to call any number of times
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Detached cancellation handle for callbacks or other tasks
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Whether the subscription has stopped or been asked to stop
    pub fn is_stopped(&self) -> bool {
        self.canceller.is_cancelled() || self.join.is_finished()
    }

    /// Wait for the subscription to stop and report why
    pub async fn wait(self) -> MonitorOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(task_id = %self.canceller.task_id, "Task monitor aborted: {}", e);
                MonitorOutcome::Aborted
            }
        }
    }
}

/// Cloneable cancel capability for one subscription
#[derive(Clone)]
pub struct Canceller {
    task_id: Arc<str>,
    stop: Arc<watch::Sender<bool>>,
}

impl Canceller {
    /// Stop polling; only the first call has any effect
    pub fn cancel(&self) {
        let already = self.stop.send_replace(true);
        if !already {
            tracing::debug!(task_id = %self.task_id, "Task monitoring cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.stop.borrow()
    }
}

/// Resolves once cancellation is requested
async fn stopped(stop_rx: &mut watch::Receiver<bool>) {
    if stop_rx.wait_for(|stop| *stop).await.is_err() {
        // Every handle is gone, nobody can cancel any more
        std::future::pending::<()>().await;
    }
}

async fn poll_loop<F>(
    source: Arc<dyn TaskStatusSource>,
    task_id: String,
    first_tick: Instant,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
    mut on_update: F,
) -> MonitorOutcome
where
    F: FnMut(&Task) + Send + 'static,
{
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stopped(&mut stop_rx) => return MonitorOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        // Cancellation drops an in-flight fetch; its result is never delivered
        let fetched = tokio::select! {
            biased;
            _ = stopped(&mut stop_rx) => {
                tracing::debug!(task_id = %task_id, "Dropping in-flight status fetch");
                return MonitorOutcome::Cancelled;
            }
            result = source.fetch_task_status(&task_id) => result,
        };

        if *stop_rx.borrow() {
            return MonitorOutcome::Cancelled;
        }

        let task = match fetched {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(
                    task_id = %task_id,
                    error = %e,
                    "Failed to fetch task status, polling stopped"
                );
                return MonitorOutcome::FetchFailed(e);
            }
        };

        tracing::debug!(
            task_id = %task_id,
            status = %task.status,
            progress = task.progress,
            "Task status polled"
        );

        on_update(&task);

        match task.status {
            TaskStatus::Completed => {
                tracing::info!(task_id = %task_id, "Task completed");
                return MonitorOutcome::Completed(task);
            }
            TaskStatus::Failed => {
                tracing::info!(
                    task_id = %task_id,
                    error = task.error_message.as_deref().unwrap_or(""),
                    "Task failed"
                );
                return MonitorOutcome::Failed(task);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ApiResult;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Replays canned responses per task id and records every fetch
    #[derive(Default)]
    struct ScriptedSource {
        scripts: Mutex<HashMap<String, VecDeque<ApiResult<Task>>>>,
        calls: Mutex<Vec<(String, Instant)>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self::default()
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        fn script(self, task_id: &str, responses: Vec<ApiResult<Task>>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(task_id.to_string(), responses.into());
            self
        }

        fn calls_for(&self, task_id: &str) -> Vec<Instant> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == task_id)
                .map(|(_, at)| *at)
                .collect()
        }
    }

    #[async_trait]
    impl TaskStatusSource for ScriptedSource {
        async fn fetch_task_status(&self, task_id: &str) -> ApiResult<Task> {
            self.calls
                .lock()
                .unwrap()
                .push((task_id.to_string(), Instant::now()));

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(task_id)
                .and_then(|queue| queue.pop_front());

            next.unwrap_or_else(|| {
                Err(ApiError::NotFound {
                    message: format!("no such task: {}", task_id),
                })
            })
        }
    }

    fn running(id: &str, progress: u8) -> ApiResult<Task> {
        Ok(Task::new(id, "data_import", TaskStatus::Running).progress(progress))
    }

    fn finished(id: &str, status: TaskStatus) -> ApiResult<Task> {
        Ok(Task::new(id, "data_import", status).progress(100))
    }

    type Seen = Arc<Mutex<Vec<(TaskStatus, u8)>>>;

    fn recorder() -> (Seen, impl FnMut(&Task) + Send + 'static) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |task: &Task| {
            sink.lock().unwrap().push((task.status, task.progress))
        })
    }

    fn offsets(calls: &[Instant], start: Instant) -> Vec<u64> {
        calls
            .iter()
            .map(|at| at.duration_since(start).as_millis() as u64)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_until_completed() {
        let source = Arc::new(ScriptedSource::new().script(
            "T1",
            vec![
                running("T1", 40),
                running("T1", 80),
                finished("T1", TaskStatus::Completed),
            ],
        ));
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();

        let start = Instant::now();
        let handle = monitor.start_monitoring("T1", on_update).unwrap();
        let outcome = handle.wait().await;

        assert!(outcome.is_success());
        assert_eq!(outcome.task().map(|t| t.progress), Some(100));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (TaskStatus::Running, 40),
                (TaskStatus::Running, 80),
                (TaskStatus::Completed, 100),
            ]
        );

        let calls = offsets(&source.calls_for("T1"), start);
        assert_eq!(calls.len(), 3);
        for (i, offset) in calls.iter().enumerate() {
            let expected = 2000 * (i as u64 + 1);
            assert!(
                *offset >= expected && *offset < expected + 10,
                "fetch {} at {}ms, expected ~{}ms",
                i,
                offset,
                expected
            );
        }

        // Nothing more is scheduled after the terminal snapshot
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(source.calls_for("T1").len(), 3);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_waits_one_interval() {
        let source = Arc::new(ScriptedSource::new().script(
            "T1",
            vec![running("T1", 10), running("T1", 20), running("T1", 30)],
        ));
        let monitor = TaskMonitor::new(source.clone());
        let handle = monitor.start_monitoring("T1", |_| {}).unwrap();

        tokio::time::sleep(Duration::from_millis(1990)).await;
        assert!(source.calls_for("T1").is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.calls_for("T1").len(), 1);

        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_is_terminal() {
        let source = Arc::new(ScriptedSource::new().script(
            "T3",
            vec![
                running("T3", 50),
                Ok(Task::new("T3", "report_generation", TaskStatus::Failed)
                    .error("template missing")),
                running("T3", 60),
            ],
        ));
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();

        let outcome = monitor.start_monitoring("T3", on_update).unwrap().wait().await;

        match outcome {
            MonitorOutcome::Failed(task) => {
                assert_eq!(task.error_message.as_deref(), Some("template missing"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(seen.lock().unwrap().len(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls_for("T3").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_stops_without_callback() {
        let source = Arc::new(ScriptedSource::new().script(
            "T2",
            vec![
                Err(ApiError::Network("connection refused".into())),
                running("T2", 10),
            ],
        ));
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();

        let outcome = monitor.start_monitoring("T2", on_update).unwrap().wait().await;

        assert_eq!(
            outcome,
            MonitorOutcome::FetchFailed(ApiError::Network("connection refused".into()))
        );
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls_for("T2").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_fetches() {
        let source = Arc::new(ScriptedSource::new().script(
            "T1",
            (0..10).map(|i| running("T1", i * 10)).collect(),
        ));
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();
        let handle = monitor.start_monitoring("T1", on_update).unwrap();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(source.calls_for("T1").len(), 2);

        handle.cancel();
        handle.cancel();
        assert!(handle.is_stopped());
        assert_eq!(handle.wait().await, MonitorOutcome::Cancelled);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(source.calls_for("T1").len(), 2);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let source = Arc::new(ScriptedSource::new().script("T1", vec![running("T1", 5)]));
        let monitor = TaskMonitor::new(source.clone());
        let handle = monitor.start_monitoring("T1", |_| {}).unwrap();

        handle.cancel();
        assert_eq!(handle.wait().await, MonitorOutcome::Cancelled);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(source.calls_for("T1").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_in_flight_result() {
        let source = Arc::new(
            ScriptedSource::with_delay(Duration::from_secs(1))
                .script("T1", vec![running("T1", 40), running("T1", 80)]),
        );
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();
        let handle = monitor.start_monitoring("T1", on_update).unwrap();

        // Fetch starts at 2s and would resolve at 3s
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(source.calls_for("T1").len(), 1);

        handle.cancel();
        assert_eq!(handle.wait().await, MonitorOutcome::Cancelled);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(source.calls_for("T1").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_completion_is_noop() {
        let source = Arc::new(
            ScriptedSource::new().script("T1", vec![finished("T1", TaskStatus::Completed)]),
        );
        let monitor = TaskMonitor::new(source.clone());
        let handle = monitor.start_monitoring("T1", |_| {}).unwrap();
        let canceller = handle.canceller();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(handle.is_stopped());

        canceller.cancel();
        handle.cancel();
        canceller.cancel();

        assert!(matches!(handle.wait().await, MonitorOutcome::Completed(_)));
        assert_eq!(source.calls_for("T1").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriptions_are_independent() {
        let source = Arc::new(
            ScriptedSource::new()
                .script(
                    "A",
                    vec![
                        running("A", 25),
                        running("A", 50),
                        running("A", 75),
                        finished("A", TaskStatus::Completed),
                    ],
                )
                .script("B", (0..10).map(|i| running("B", i)).collect()),
        );
        let monitor = TaskMonitor::new(source.clone());
        let (seen_a, on_a) = recorder();
        let (seen_b, on_b) = recorder();

        let handle_a = monitor.start_monitoring("A", on_a).unwrap();
        let handle_b = monitor.start_monitoring("B", on_b).unwrap();

        tokio::time::sleep(Duration::from_millis(3000)).await;
        handle_b.cancel();

        assert!(handle_a.wait().await.is_success());
        assert_eq!(handle_b.wait().await, MonitorOutcome::Cancelled);

        assert_eq!(seen_a.lock().unwrap().len(), 4);
        assert_eq!(seen_b.lock().unwrap().len(), 1);
        assert_eq!(source.calls_for("A").len(), 4);
        assert_eq!(source.calls_for("B").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_keeps_polling() {
        let source = Arc::new(ScriptedSource::new().script(
            "T1",
            vec![running("T1", 50), finished("T1", TaskStatus::Completed)],
        ));
        let monitor = TaskMonitor::new(source.clone());
        let (seen, on_update) = recorder();

        drop(monitor.start_monitoring("T1", on_update).unwrap());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(source.calls_for("T1").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_interval() {
        let source = Arc::new(ScriptedSource::new().script(
            "T1",
            vec![running("T1", 50), finished("T1", TaskStatus::Completed)],
        ));
        let monitor = TaskMonitor::new(source.clone()).with_interval(Duration::from_millis(500));
        assert_eq!(monitor.interval(), Duration::from_millis(500));

        let start = Instant::now();
        let outcome = monitor.start_monitoring("T1", |_| {}).unwrap().wait().await;

        assert!(outcome.is_success());
        let calls = offsets(&source.calls_for("T1"), start);
        assert_eq!(calls.len(), 2);
        assert!(calls[1] >= 1000 && calls[1] < 1010);
    }

    #[tokio::test]
    async fn test_empty_task_id_rejected() {
        let monitor = TaskMonitor::new(Arc::new(ScriptedSource::new()));
        let err = monitor.start_monitoring("  ", |_| {}).err();
        assert!(matches!(err, Some(MonitorError::InvalidArgument(_))));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("Invalid argument: task id must not be empty")
        );
    }
}
