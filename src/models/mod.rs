//! Backend resource types
//!
//! Typed views of the JSON resources served by the Hotel BI backend:
//! - `HotelData` and `KpiMetric`: operational data and computed KPIs
//! - `Report` and `ReportRequest`: report generation
//! - `Task`: asynchronous backend jobs (imports, report rendering)
//! - Upload and authentication payloads

mod auth;
mod hotel;
mod report;
mod task;
mod upload;

pub use auth::{LoginRequest, LoginResult, User};
pub use hotel::{HotelData, KpiMetric, MetricQuery, PeriodType};
pub use report::{Report, ReportFiles, ReportFormat, ReportRequest, ReportStatus, ReportType};
pub use task::{CancelResult, Task, TaskQuery, TaskReceipt, TaskStatus};
pub use upload::{UploadReceipt, UploadTemplate};

/// Serde helpers for the backend's loosely typed fields
pub(crate) mod serde_helpers {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parse RFC 3339 or the backend's naive ISO timestamps (assumed UTC)
    pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }

    /// Percent value clamped into 0..=100
    pub fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
        Ok(raw.clamp(0.0, 100.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::serde_helpers::parse_timestamp;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let naive = parse_timestamp("2024-03-01T10:15:30.123456").unwrap();
        assert_eq!(naive.hour(), 10);
        assert_eq!(naive.day(), 1);

        let zoned = parse_timestamp("2024-03-01T10:15:30+08:00").unwrap();
        assert_eq!(zoned.hour(), 2);

        let spaced = parse_timestamp("2024-03-01 10:15:30").unwrap();
        assert_eq!(spaced.minute(), 15);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
