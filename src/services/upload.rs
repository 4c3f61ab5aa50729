//! Data file uploads
//!
//! Files are sent as multipart forms; the backend answers with the id of
//! the import task, which can then be watched with the task monitor.

use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::sync::Arc;

use super::Listing;
use crate::models::{UploadReceipt, UploadTemplate};
use crate::transport::{ApiClient, ApiError, ApiResult};

/// Extensions the backend importer understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "json"];

#[derive(Clone)]
pub struct UploadService {
    api: Arc<ApiClient>,
}

impl UploadService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Upload a data file from disk for `hotel_id`
    pub async fn upload_file(&self, path: &Path, hotel_id: &str) -> ApiResult<UploadReceipt> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidRequest(format!("Invalid file path: {:?}", path)))?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(&file_name, bytes, hotel_id).await
    }

    /// Upload in-memory file content under `file_name`
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        hotel_id: &str,
    ) -> ApiResult<UploadReceipt> {
        let mime = mime_for(file_name)?;

        tracing::info!(file = %file_name, size = bytes.len(), hotel_id, "Uploading data file");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;

        let form = Form::new()
            .part("file", part)
            .text("hotel_id", hotel_id.to_string());

        self.api.post_multipart("/upload", form).await
    }

    /// Spreadsheet templates offered by the backend
    pub async fn get_templates(&self) -> ApiResult<Vec<UploadTemplate>> {
        let listing: Listing<UploadTemplate> = self.api.get_json("/templates").await?;
        Ok(listing.into_vec())
    }
}

fn mime_for(file_name: &str) -> ApiResult<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" => Ok("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "xls" => Ok("application/vnd.ms-excel"),
        "csv" => Ok("text/csv"),
        "json" => Ok("application/json"),
        _ => Err(ApiError::InvalidRequest(format!(
            "Unsupported file type '{}', expected one of: {}",
            file_name,
            SUPPORTED_EXTENSIONS.join(", ")
        ))),
    }
}
