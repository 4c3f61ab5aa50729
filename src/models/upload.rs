use serde::{Deserialize, Serialize};

/// Acknowledgement of an accepted data file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    /// Import job to poll
    pub task_id: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Downloadable spreadsheet template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadTemplate {
    pub name: String,
    pub url: String,
}
