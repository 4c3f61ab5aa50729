//! Hotel operational data and KPI metrics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers;

/// Daily operational record for a hotel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelData {
    pub id: i64,
    pub hotel_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub room_count: Option<u32>,
    #[serde(default)]
    pub rooms_occupied: Option<u32>,
    /// Fraction or percentage, as stored by the backend
    #[serde(default)]
    pub occupancy_rate: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Average Daily Rate
    #[serde(default)]
    pub adr: Option<f64>,
    /// Revenue Per Available Room
    #[serde(default)]
    pub revpar: Option<f64>,
    #[serde(default)]
    pub date_recorded: Option<NaiveDate>,
    #[serde(deserialize_with = "serde_helpers::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aggregation period of a KPI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(PeriodType::Daily),
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            "yearly" => Ok(PeriodType::Yearly),
            other => Err(format!("unknown period type: {}", other)),
        }
    }
}

/// A computed KPI value for one hotel and period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiMetric {
    pub id: i64,
    pub hotel_id: i64,
    pub metric_name: String,
    #[serde(default)]
    pub metric_value: Option<f64>,
    #[serde(default)]
    pub metric_type: Option<String>,
    /// Kept as a string: the backend does not restrict it to [`PeriodType`]
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
}

/// Filters for `GET /metrics`
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_type: Option<PeriodType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl MetricQuery {
    /// Builder method: restrict to one hotel
    pub fn hotel(mut self, hotel_id: i64) -> Self {
        self.hotel_id = Some(hotel_id);
        self
    }

    /// Builder method: restrict to one period type
    pub fn period(mut self, period_type: PeriodType) -> Self {
        self.period_type = Some(period_type);
        self
    }

    /// Builder method: restrict to a date range (inclusive)
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}
