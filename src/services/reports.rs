//! Report generation and retrieval

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::Listing;
use crate::models::{Report, ReportFormat, ReportRequest, TaskReceipt};
use crate::transport::{ApiClient, ApiError, ApiResult};

#[derive(Clone)]
pub struct ReportService {
    api: Arc<ApiClient>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default = "default_true")]
    success: bool,
}

fn default_true() -> bool {
    true
}

impl ReportService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Queue a report; the returned task tracks rendering progress
    pub async fn generate_report(&self, request: &ReportRequest) -> ApiResult<TaskReceipt> {
        request.validate().map_err(ApiError::InvalidRequest)?;

        tracing::info!(
            title = %request.title,
            report_type = %request.report_type,
            hotels = request.hotel_ids.len(),
            "Requesting report generation"
        );

        self.api.post_json("/reports/generate", request).await
    }

    pub async fn get_reports(&self) -> ApiResult<Vec<Report>> {
        let listing: Listing<Report> = self.api.get_json("/reports").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_report_by_id(&self, report_id: i64) -> ApiResult<Report> {
        self.api.get_json(&format!("/reports/{}", report_id)).await
    }

    /// Raw document bytes in the requested format
    pub async fn download_report(
        &self,
        report_id: i64,
        format: ReportFormat,
    ) -> ApiResult<Vec<u8>> {
        self.api
            .get_bytes(
                &format!("/reports/{}/download", report_id),
                &[("format", format.as_str())],
            )
            .await
    }

    /// Download a report and write it to `path`, returning the byte count
    pub async fn save_report(
        &self,
        report_id: i64,
        format: ReportFormat,
        path: &Path,
    ) -> ApiResult<usize> {
        let bytes = self.download_report(report_id, format).await?;
        tokio::fs::write(path, &bytes).await?;
        tracing::info!(report_id, path = ?path, size = bytes.len(), "Report saved");
        Ok(bytes.len())
    }

    pub async fn delete_report(&self, report_id: i64) -> ApiResult<bool> {
        let response: DeleteResponse = self
            .api
            .delete_json(&format!("/reports/{}", report_id))
            .await?;
        Ok(response.success)
    }
}
