//! Hotel and KPI data access

use std::sync::Arc;

use super::Listing;
use crate::models::{HotelData, KpiMetric, MetricQuery};
use crate::transport::{ApiClient, ApiResult};

#[derive(Clone)]
pub struct DataService {
    api: Arc<ApiClient>,
}

impl DataService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// All hotels visible to the current user
    pub async fn get_hotels(&self) -> ApiResult<Vec<HotelData>> {
        let listing: Listing<HotelData> = self.api.get_json("/hotels").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_hotel_by_id(&self, hotel_id: i64) -> ApiResult<HotelData> {
        self.api.get_json(&format!("/hotels/{}", hotel_id)).await
    }

    /// KPI values matching the given filters
    pub async fn get_metrics(&self, query: &MetricQuery) -> ApiResult<Vec<KpiMetric>> {
        let listing: Listing<KpiMetric> = self.api.get_json_with_query("/metrics", query).await?;
        Ok(listing.into_vec())
    }
}
