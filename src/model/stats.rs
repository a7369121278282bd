use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub maintenance: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlarmCounts {
    pub total: u64,
    pub active: u64,
    pub critical: u64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionRollup {
    pub region: String,
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub maintenance: u64,
    pub active_alarms: u64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedSite {
    pub site: String,
    pub region: String,
    pub alarm_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub sites: SiteCounts,
    pub alarms: AlarmCounts,
    pub alarms_by_type: Vec<GroupCount>,
    pub alarms_by_severity: Vec<GroupCount>,
    pub sites_by_region: Vec<RegionRollup>,
    pub top_impacted_sites: Vec<ImpactedSite>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamTicketCount {
    pub team: String,
    pub count: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
    pub by_priority: Vec<GroupCount>,
    pub by_team: Vec<TeamTicketCount>,
    pub recent_count: u64,
}
