use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

use crate::entity::alarm::Entity as AlarmEntity;
use crate::entity::site::Entity as SiteEntity;
use crate::entity::team::Entity as TeamEntity;
use crate::entity::ticket::{self, Entity as TicketEntity};
use crate::entity::ticket_attachment::{self, Entity as TicketAttachmentEntity};
use crate::entity::ticket_update::{self, Entity as TicketUpdateEntity};
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::ticket::{
    TicketAssignRequest, TicketAttachmentRequest, TicketAttachmentResponse, TicketCommentRequest,
    TicketCreateRequest, TicketDetailResponse, TicketListQuery, TicketResponse,
    TicketUpdateRequest, TicketUpdateResponse,
};
use crate::service;
use crate::service::ticket::visibility_scope;

struct TicketJoins {
    alarm_titles: HashMap<i32, String>,
    alarm_sites: HashMap<i32, i32>,
    site_names: HashMap<i32, String>,
    team_names: HashMap<i32, String>,
    usernames: HashMap<i32, String>,
}

impl TicketJoins {
    async fn load(db: &DatabaseConnection) -> Result<Self, AppError> {
        let alarms = AlarmEntity::find().all(db).await?;
        let sites = SiteEntity::find().all(db).await?;
        let teams = TeamEntity::find().all(db).await?;
        let usernames = super::alarm::username_map(db).await?;

        Ok(Self {
            alarm_titles: alarms.iter().map(|a| (a.id, a.title.clone())).collect(),
            alarm_sites: alarms.iter().map(|a| (a.id, a.site_id)).collect(),
            site_names: sites.into_iter().map(|s| (s.id, s.name)).collect(),
            team_names: teams.into_iter().map(|t| (t.id, t.name)).collect(),
            usernames,
        })
    }

    fn response(&self, t: ticket::Model) -> TicketResponse {
        let site_name = self
            .alarm_sites
            .get(&t.alarm_id)
            .and_then(|site_id| self.site_names.get(site_id))
            .cloned();

        TicketResponse::new(
            t.clone(),
            self.alarm_titles.get(&t.alarm_id).cloned(),
            site_name,
            self.team_names.get(&t.team_id).cloned(),
            t.assigned_to.and_then(|id| self.usernames.get(&id).cloned()),
        )
    }
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    responses(
        (status = 200, description = "Tickets visible to the caller, newest first", body = Vec<TicketResponse>),
    ),
)]
#[get("/tickets")]
pub async fn list_tickets(
    db: web::Data<DatabaseConnection>,
    query: web::Query<TicketListQuery>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let mut finder = TicketEntity::find().order_by_desc(ticket::Column::CreatedAt);

    if let Some(scope) = visibility_scope(&current) {
        finder = finder.filter(scope);
    }
    if let Some(team_id) = query.team {
        finder = finder.filter(ticket::Column::TeamId.eq(team_id));
    }
    if let Some(status) = query.status {
        finder = finder.filter(ticket::Column::Status.eq(status));
    }
    if let Some(priority) = query.priority {
        finder = finder.filter(ticket::Column::Priority.eq(priority));
    }
    if let Some(user_id) = query.assigned_to {
        finder = finder.filter(ticket::Column::AssignedTo.eq(user_id));
    }

    let tickets = finder.all(db.get_ref()).await?;
    let joins = TicketJoins::load(db.get_ref()).await?;

    let response: Vec<TicketResponse> = tickets.into_iter().map(|t| joins.response(t)).collect();

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = TicketCreateRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 409, description = "The alarm already has a ticket"),
    ),
)]
#[post("/tickets")]
pub async fn create_ticket(
    body: web::Json<TicketCreateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.can_raise_work() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    validate_ticket_request(&body)?;

    let inserted = service::ticket::create(db.get_ref(), &body, &current).await?;

    let joins = TicketJoins::load(db.get_ref()).await?;
    Ok(HttpResponse::Created().json(joins.response(inserted)))
}

#[get("/tickets/{id}")]
pub async fn get_ticket(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let ticket_id = path.into_inner();

    let ticket = service::ticket::find_visible(db.get_ref(), ticket_id, &current).await?;

    let updates = TicketUpdateEntity::find()
        .filter(ticket_update::Column::TicketId.eq(ticket_id))
        .order_by_desc(ticket_update::Column::CreatedAt)
        .all(db.get_ref())
        .await?;

    let attachments = TicketAttachmentEntity::find()
        .filter(ticket_attachment::Column::TicketId.eq(ticket_id))
        .order_by_desc(ticket_attachment::Column::UploadedAt)
        .all(db.get_ref())
        .await?;

    let joins = TicketJoins::load(db.get_ref()).await?;

    let update_responses: Vec<TicketUpdateResponse> = updates
        .into_iter()
        .map(|u| {
            let username = joins.usernames.get(&u.user_id).cloned();
            TicketUpdateResponse::new(u, username)
        })
        .collect();

    Ok(HttpResponse::Ok().json(TicketDetailResponse {
        ticket: joins.response(ticket),
        updates: update_responses,
        attachments: attachments.into_iter().map(Into::into).collect(),
    }))
}

#[put("/tickets/{id}")]
pub async fn update_ticket(
    path: web::Path<i32>,
    body: web::Json<TicketUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let updated = service::ticket::update_status(
        db.get_ref(),
        path.into_inner(),
        &current,
        body.status,
        body.resolution.clone(),
        body.comment.clone(),
    )
    .await?;

    let joins = TicketJoins::load(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(joins.response(updated)))
}

#[delete("/tickets/{id}")]
pub async fn delete_ticket(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.is_admin() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let ticket_id = path.into_inner();

    let ticket = TicketEntity::find_by_id(ticket_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::TicketNotFound))?;

    ticket.delete(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/tickets/{id}/comment")]
pub async fn add_ticket_comment(
    path: web::Path<i32>,
    body: web::Json<TicketCommentRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let update =
        service::ticket::add_comment(db.get_ref(), path.into_inner(), &current, &body.comment)
            .await?;

    let usernames = super::alarm::username_map(db.get_ref()).await?;
    let username = usernames.get(&update.user_id).cloned();

    Ok(HttpResponse::Created().json(TicketUpdateResponse::new(update, username)))
}

#[post("/tickets/{id}/assign")]
pub async fn assign_ticket(
    path: web::Path<i32>,
    body: web::Json<TicketAssignRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let updated =
        service::ticket::assign(db.get_ref(), path.into_inner(), &current, body.user_id).await?;

    let joins = TicketJoins::load(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(joins.response(updated)))
}

/// Records attachment metadata; the file itself lands in object storage
/// under the generated path.
#[post("/tickets/{id}/attachment")]
pub async fn add_ticket_attachment(
    path: web::Path<i32>,
    body: web::Json<TicketAttachmentRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if body.filename.trim().is_empty() {
        return Err(AppError::field("filename", "Filename is required"));
    }

    let ticket_id = path.into_inner();
    let ticket = service::ticket::find_visible(db.get_ref(), ticket_id, &current).await?;

    let file_path = format!(
        "ticket_attachments/{}_{}",
        uuid::Uuid::new_v4(),
        body.filename.trim()
    );

    let attachment = ticket_attachment::ActiveModel {
        ticket_id: Set(ticket.id),
        file_path: Set(file_path),
        filename: Set(body.filename.trim().to_string()),
        uploaded_by: Set(current.id),
        uploaded_at: Set(Utc::now().into()),
        ..Default::default()
    };

    let inserted = attachment.insert(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(TicketAttachmentResponse::from(inserted)))
}

#[get("/tickets/stats")]
pub async fn ticket_stats(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let stats = service::stats::ticket_stats(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(stats))
}

fn validate_ticket_request(body: &TicketCreateRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if body.title.trim().is_empty() {
        errors.push(ValidationFieldError {
            field: "title".to_string(),
            message: "Title is required".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}
