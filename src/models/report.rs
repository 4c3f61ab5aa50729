//! Analysis reports

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Kind of analysis a report contains
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Analysis,
    Comparison,
    Forecast,
}

impl std::str::FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analysis" => Ok(ReportType::Analysis),
            "comparison" => Ok(ReportType::Comparison),
            "forecast" => Ok(ReportType::Forecast),
            other => Err(format!("unknown report type: {}", other)),
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportType::Analysis => write!(f, "analysis"),
            ReportType::Comparison => write!(f, "comparison"),
            ReportType::Forecast => write!(f, "forecast"),
        }
    }
}

/// Rendering state of a report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
            ReportStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Output document format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Ppt,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Ppt => "ppt",
        }
    }

    /// File extension used when saving a download
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Ppt => "pptx",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "ppt" | "pptx" => Ok(ReportFormat::Ppt),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side paths of rendered documents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportFiles {
    #[serde(default)]
    pub pdf: Option<String>,
    #[serde(default)]
    pub ppt: Option<String>,
}

impl ReportFiles {
    pub fn get(&self, format: ReportFormat) -> Option<&str> {
        match format {
            ReportFormat::Pdf => self.pdf.as_deref(),
            ReportFormat::Ppt => self.ppt.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub report_type: String,
    pub status: ReportStatus,
    #[serde(deserialize_with = "serde_helpers::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_paths: Option<ReportFiles>,
}

/// Body of `POST /reports/generate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRequest {
    pub title: String,
    pub report_type: ReportType,
    pub hotel_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub output_formats: Vec<ReportFormat>,
    pub include_ai_analysis: bool,
}

impl ReportRequest {
    /// Request with both output formats and AI analysis enabled
    pub fn new(title: impl Into<String>, report_type: ReportType, hotel_ids: Vec<i64>) -> Self {
        Self {
            title: title.into(),
            report_type,
            hotel_ids,
            period_start: None,
            period_end: None,
            output_formats: vec![ReportFormat::Pdf, ReportFormat::Ppt],
            include_ai_analysis: true,
        }
    }

    /// Builder method: set the reporting period
    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period_start = Some(start);
        self.period_end = Some(end);
        self
    }

    /// Builder method: choose output formats
    pub fn formats(mut self, formats: Vec<ReportFormat>) -> Self {
        self.output_formats = formats;
        self
    }

    /// Builder method: toggle AI analysis
    pub fn ai_analysis(mut self, enabled: bool) -> Self {
        self.include_ai_analysis = enabled;
        self
    }

    /// Check the request before sending it
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("report title must not be empty".to_string());
        }
        if self.hotel_ids.is_empty() {
            return Err("at least one hotel id is required".to_string());
        }
        if self.output_formats.is_empty() {
            return Err("at least one output format is required".to_string());
        }
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            if end < start {
                return Err("period end must not be before period start".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ReportRequest::new("Q1 review", ReportType::Comparison, vec![1, 2])
            .period(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            )
            .formats(vec![ReportFormat::Pdf]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["report_type"], "comparison");
        assert_eq!(value["output_formats"], serde_json::json!(["pdf"]));
        assert_eq!(value["period_start"], "2024-01-01");
        assert_eq!(value["include_ai_analysis"], true);
    }

    #[test]
    fn test_request_validation() {
        let ok = ReportRequest::new("t", ReportType::Analysis, vec![1]);
        assert!(ok.validate().is_ok());

        assert!(ReportRequest::new(" ", ReportType::Analysis, vec![1]).validate().is_err());
        assert!(ReportRequest::new("t", ReportType::Analysis, vec![]).validate().is_err());
        assert!(ok.clone().formats(vec![]).validate().is_err());

        let backwards = ok.period(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn test_deserialize_report() {
        let json = r#"{
            "id": 9,
            "title": "Monthly",
            "report_type": "analysis",
            "status": "completed",
            "created_at": "2024-05-01T09:00:00Z",
            "completed_at": "2024-05-01T09:02:10",
            "file_paths": {"pdf": "/reports/9.pdf"}
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.status, ReportStatus::Completed);
        let files = report.file_paths.unwrap();
        assert_eq!(files.get(ReportFormat::Pdf), Some("/reports/9.pdf"));
        assert_eq!(files.get(ReportFormat::Ppt), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PPTX".parse::<ReportFormat>().unwrap(), ReportFormat::Ppt);
        assert_eq!(ReportFormat::Ppt.as_str(), "ppt");
        assert!("docx".parse::<ReportFormat>().is_err());
    }
}
