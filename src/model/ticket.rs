use crate::entity::ticket::{self, Priority, TicketStatus};
use crate::entity::{ticket_attachment, ticket_update};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreateRequest {
    pub alarm_id: i32,
    pub team_id: i32,
    pub priority: Priority,
    pub assigned_to: Option<i32>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateRequest {
    pub status: Option<TicketStatus>,
    pub resolution: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketAssignRequest {
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketCommentRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketAttachmentRequest {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub team: Option<i32>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: i32,
    pub alarm_id: i32,
    pub alarm_title: Option<String>,
    pub site_name: Option<String>,
    pub team_id: i32,
    pub team_name: Option<String>,
    pub assigned_to: Option<i32>,
    pub assigned_to_name: Option<String>,
    pub status: TicketStatus,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub resolution: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketResponse {
    pub fn new(
        ticket: ticket::Model,
        alarm_title: Option<String>,
        site_name: Option<String>,
        team_name: Option<String>,
        assigned_to_name: Option<String>,
    ) -> Self {
        Self {
            id: ticket.id,
            alarm_id: ticket.alarm_id,
            alarm_title,
            site_name,
            team_id: ticket.team_id,
            team_name,
            assigned_to: ticket.assigned_to,
            assigned_to_name,
            status: ticket.status,
            priority: ticket.priority,
            title: ticket.title,
            description: ticket.description,
            resolution: ticket.resolution,
            resolved_at: ticket.resolved_at.map(Into::into),
            closed_at: ticket.closed_at.map(Into::into),
            created_at: ticket.created_at.into(),
            updated_at: ticket.updated_at.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub comment: String,
    pub status_changed_from: String,
    pub status_changed_to: String,
    pub created_at: DateTime<Utc>,
}

impl TicketUpdateResponse {
    pub fn new(update: ticket_update::Model, username: Option<String>) -> Self {
        Self {
            id: update.id,
            user_id: update.user_id,
            username,
            comment: update.comment,
            status_changed_from: update.status_changed_from,
            status_changed_to: update.status_changed_to,
            created_at: update.created_at.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketAttachmentResponse {
    pub id: i32,
    pub file_path: String,
    pub filename: String,
    pub uploaded_by: i32,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ticket_attachment::Model> for TicketAttachmentResponse {
    fn from(att: ticket_attachment::Model) -> Self {
        Self {
            id: att.id,
            file_path: att.file_path,
            filename: att.filename,
            uploaded_by: att.uploaded_by,
            uploaded_at: att.uploaded_at.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailResponse {
    pub ticket: TicketResponse,
    pub updates: Vec<TicketUpdateResponse>,
    pub attachments: Vec<TicketAttachmentResponse>,
}
