//! Typed Resource Services
//!
//! One service per backend resource group, all sharing a single
//! [`ApiClient`]:
//!
//! - `GET /hotels`, `GET /hotels/:id`, `GET /metrics` - [`DataService`]
//! - `POST /upload`, `GET /templates` - [`UploadService`]
//! - `POST /reports/generate`, `GET /reports`, `GET /reports/:id`,
//!   `GET /reports/:id/download`, `DELETE /reports/:id` - [`ReportService`]
//! - `GET /tasks`, `GET /tasks/:id`, `DELETE /tasks/:id` - [`TaskService`]
//! - `POST /auth/login`, `POST /auth/logout` - [`AuthService`]

mod auth;
mod data;
mod reports;
mod tasks;
mod upload;

pub use auth::AuthService;
pub use data::DataService;
pub use reports::ReportService;
pub use tasks::TaskService;
pub use upload::{UploadService, SUPPORTED_EXTENSIONS};

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::transport::ApiClient;

/// All services bound to one backend connection
#[derive(Clone)]
pub struct HotelBiClient {
    pub data: DataService,
    pub uploads: UploadService,
    pub reports: ReportService,
    pub tasks: TaskService,
    pub auth: AuthService,
}

impl HotelBiClient {
    pub fn new(api: Arc<ApiClient>, poll_interval: Duration) -> Self {
        Self {
            data: DataService::new(Arc::clone(&api)),
            uploads: UploadService::new(Arc::clone(&api)),
            reports: ReportService::new(Arc::clone(&api)),
            tasks: TaskService::new(Arc::clone(&api)).with_poll_interval(poll_interval),
            auth: AuthService::new(api),
        }
    }
}

/// List payloads arrive either bare or paginated (`{ "items": [...], ... }`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Plain(Vec<T>),
    Paged { items: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Plain(items) | Listing::Paged { items } => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_shapes() {
        let plain: Listing<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2, 3]);

        let paged: Listing<u32> =
            serde_json::from_str(r#"{"items": [4], "total": 1, "page": 1, "size": 10, "pages": 1}"#)
                .unwrap();
        assert_eq!(paged.into_vec(), vec![4]);
    }
}
