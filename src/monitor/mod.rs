//! Async Task Monitor
//!
//! Polls long-running backend jobs (file imports, report rendering) until
//! they finish.
//!
//! ## Lifecycle
//!
//! A subscription is Active from [`TaskMonitor::start_monitoring`] until
//! one of:
//! 1. a snapshot reports `completed` or `failed`
//! 2. a status fetch fails (no retry)
//! 3. the caller cancels through [`MonitorHandle`] or a [`Canceller`]
//!
//! after which it is Stopped for good. [`MonitorHandle::wait`] reports which
//! of these happened as a [`MonitorOutcome`].

mod poller;
mod source;

pub use poller::{
    Canceller, MonitorError, MonitorHandle, MonitorOutcome, TaskMonitor, DEFAULT_POLL_INTERVAL,
};
pub use source::TaskStatusSource;
