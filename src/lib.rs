//! # Hotel BI
//!
//! Client for a hotel business-intelligence backend: typed access to hotels,
//! KPI metrics, uploads, reports and background tasks, plus a monitor that
//! follows long-running tasks to completion.
//!
//! ## Modules
//!
//! - [`transport`]: HTTP client, credential storage, error normalization
//! - [`models`]: typed backend resources
//! - [`services`]: one service per resource group
//! - [`monitor`]: cancellable task-status polling
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotel_bi::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Arc::new(MemoryCredentialStore::new());
//!     let api = Arc::new(ApiClient::new(ClientConfig::default(), credentials)?);
//!     let client = HotelBiClient::new(api, Duration::from_secs(2));
//!
//!     client.auth.login("analyst", "secret").await?;
//!
//!     let request = ReportRequest::new("Q1 review", ReportType::Analysis, vec![1, 2]);
//!     let receipt = client.reports.generate_report(&request).await?;
//!
//!     let handle = client.tasks.poll_task_status(&receipt.task_id, |task| {
//!         println!("{}: {}%", task.status, task.progress);
//!     })?;
//!
//!     match handle.wait().await {
//!         MonitorOutcome::Completed(_) => println!("Report ready"),
//!         other => println!("Report not produced: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod models;
pub mod monitor;
pub mod services;
pub mod transport;

// Re-export top-level types for convenience
pub use models::{
    CancelResult, HotelData, KpiMetric, LoginResult, MetricQuery, PeriodType, Report, ReportFiles,
    ReportFormat, ReportRequest, ReportStatus, ReportType, Task, TaskQuery, TaskReceipt,
    TaskStatus, UploadReceipt, UploadTemplate, User,
};

pub use monitor::{
    Canceller, MonitorError, MonitorHandle, MonitorOutcome, TaskMonitor, TaskStatusSource,
    DEFAULT_POLL_INTERVAL,
};

pub use services::{
    AuthService, DataService, HotelBiClient, ReportService, TaskService, UploadService,
};

pub use transport::{
    ApiClient, ApiError, ApiResult, ClientConfig, CredentialStore, FileCredentialStore,
    MemoryCredentialStore,
};

pub use config::{ApiConfig, AuthConfig, Config, ConfigError, LoggingConfig, MonitorConfig};
