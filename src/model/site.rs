use crate::entity::site::{self, SiteStatus};
use crate::entity::region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub site_count: usize,
    pub created_at: DateTime<Utc>,
}

impl RegionResponse {
    pub fn new(region: region::Model, site_count: usize) -> Self {
        Self {
            id: region.id,
            name: region.name,
            code: region.code,
            description: region.description,
            site_count,
            created_at: region.created_at.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteCreateRequest {
    pub name: String,
    pub code: String,
    pub region_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<SiteStatus>,
    pub ip_address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpdateRequest {
    pub name: Option<String>,
    pub region_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<SiteStatus>,
    pub ip_address: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub region_id: i32,
    pub region_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: SiteStatus,
    pub ip_address: String,
    pub last_ping: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteResponse {
    pub fn new(site: site::Model, region_name: Option<String>) -> Self {
        Self {
            id: site.id,
            name: site.name,
            code: site.code,
            region_id: site.region_id,
            region_name,
            latitude: site.latitude,
            longitude: site.longitude,
            status: site.status,
            ip_address: site.ip_address,
            last_ping: site.last_ping.map(Into::into),
            created_at: site.created_at.into(),
            updated_at: site.updated_at.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SiteListQuery {
    pub region: Option<i32>,
    pub status: Option<SiteStatus>,
}
