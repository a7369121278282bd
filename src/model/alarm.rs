use crate::entity::alarm::{self, AlarmStatus, AlarmType, Severity};
use crate::entity::alarm_history;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmCreateRequest {
    pub site_id: i32,
    pub alarm_type: AlarmType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

/// Descriptive fields only. Status never changes through the generic update
/// path; acknowledge/resolve are the only transitions.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmUpdateRequest {
    pub alarm_type: Option<AlarmType>,
    pub severity: Option<Severity>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AlarmActionRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlarmListQuery {
    pub site: Option<i32>,
    pub region: Option<i32>,
    #[serde(rename = "type")]
    pub alarm_type: Option<AlarmType>,
    pub severity: Option<Severity>,
    pub status: Option<AlarmStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmResponse {
    pub id: i32,
    pub site_id: i32,
    pub site_name: Option<String>,
    pub site_code: Option<String>,
    pub region_name: Option<String>,
    pub alarm_type: AlarmType,
    pub severity: Severity,
    pub status: AlarmStatus,
    pub title: String,
    pub description: String,
    pub acknowledged_by: Option<i32>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlarmResponse {
    pub fn new(
        alarm: alarm::Model,
        site_name: Option<String>,
        site_code: Option<String>,
        region_name: Option<String>,
    ) -> Self {
        Self {
            id: alarm.id,
            site_id: alarm.site_id,
            site_name,
            site_code,
            region_name,
            alarm_type: alarm.alarm_type,
            severity: alarm.severity,
            status: alarm.status,
            title: alarm.title,
            description: alarm.description,
            acknowledged_by: alarm.acknowledged_by,
            acknowledged_at: alarm.acknowledged_at.map(Into::into),
            resolved_by: alarm.resolved_by,
            resolved_at: alarm.resolved_at.map(Into::into),
            created_at: alarm.created_at.into(),
            updated_at: alarm.updated_at.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmHistoryResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub action: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl AlarmHistoryResponse {
    pub fn new(entry: alarm_history::Model, username: Option<String>) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            username,
            action: entry.action,
            comment: entry.comment,
            created_at: entry.created_at.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDetailResponse {
    pub alarm: AlarmResponse,
    pub history: Vec<AlarmHistoryResponse>,
}
