use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

use crate::entity::alarm::{self, AlarmStatus, Entity as AlarmEntity};
use crate::entity::alarm_history::{self, Entity as AlarmHistoryEntity};
use crate::entity::region::Entity as RegionEntity;
use crate::entity::site::{self, Entity as SiteEntity};
use crate::entity::user::Entity as UserEntity;
use crate::model::alarm::{
    AlarmActionRequest, AlarmCreateRequest, AlarmDetailResponse, AlarmHistoryResponse,
    AlarmListQuery, AlarmResponse, AlarmUpdateRequest,
};
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::service;

#[utoipa::path(
    get,
    path = "/api/alarms",
    responses(
        (status = 200, description = "Alarms, newest first", body = Vec<AlarmResponse>),
    ),
)]
#[get("/alarms")]
pub async fn list_alarms(
    db: web::Data<DatabaseConnection>,
    query: web::Query<AlarmListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut finder = AlarmEntity::find()
        .find_also_related(SiteEntity)
        .order_by_desc(alarm::Column::CreatedAt);

    if let Some(site_id) = query.site {
        finder = finder.filter(alarm::Column::SiteId.eq(site_id));
    }
    if let Some(region_id) = query.region {
        finder = finder.filter(site::Column::RegionId.eq(region_id));
    }
    if let Some(alarm_type) = query.alarm_type {
        finder = finder.filter(alarm::Column::AlarmType.eq(alarm_type));
    }
    if let Some(severity) = query.severity {
        finder = finder.filter(alarm::Column::Severity.eq(severity));
    }
    if let Some(status) = query.status {
        finder = finder.filter(alarm::Column::Status.eq(status));
    }

    let alarms = finder.all(db.get_ref()).await?;
    let region_names = region_name_map(db.get_ref()).await?;

    let response: Vec<AlarmResponse> = alarms
        .into_iter()
        .map(|(a, s)| {
            let region_name = s
                .as_ref()
                .and_then(|s| region_names.get(&s.region_id).cloned());
            AlarmResponse::new(
                a,
                s.as_ref().map(|s| s.name.clone()),
                s.map(|s| s.code),
                region_name,
            )
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

#[post("/alarms")]
pub async fn create_alarm(
    body: web::Json<AlarmCreateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.can_raise_work() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    validate_alarm_request(&body)?;

    let site = SiteEntity::find_by_id(body.site_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SiteNotFound))?;

    let now = Utc::now();
    let new_alarm = alarm::ActiveModel {
        site_id: Set(body.site_id),
        alarm_type: Set(body.alarm_type),
        severity: Set(body.severity),
        status: Set(AlarmStatus::Active),
        title: Set(body.title.clone()),
        description: Set(body.description.clone()),
        acknowledged_by: Set(None),
        acknowledged_at: Set(None),
        resolved_by: Set(None),
        resolved_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = new_alarm.insert(db.get_ref()).await?;

    tracing::info!(
        alarm_id = inserted.id,
        site_id = inserted.site_id,
        "alarm raised"
    );

    let region = RegionEntity::find_by_id(site.region_id)
        .one(db.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(AlarmResponse::new(
        inserted,
        Some(site.name),
        Some(site.code),
        region.map(|r| r.name),
    )))
}

#[get("/alarms/{id}")]
pub async fn get_alarm(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let alarm_id = path.into_inner();

    let (alarm, site) = AlarmEntity::find_by_id(alarm_id)
        .find_also_related(SiteEntity)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    let region = match &site {
        Some(site) => {
            RegionEntity::find_by_id(site.region_id)
                .one(db.get_ref())
                .await?
        }
        None => None,
    };

    let history = AlarmHistoryEntity::find()
        .filter(alarm_history::Column::AlarmId.eq(alarm_id))
        .order_by_desc(alarm_history::Column::CreatedAt)
        .all(db.get_ref())
        .await?;

    let usernames = username_map(db.get_ref()).await?;
    let history_response: Vec<AlarmHistoryResponse> = history
        .into_iter()
        .map(|h| {
            let username = usernames.get(&h.user_id).cloned();
            AlarmHistoryResponse::new(h, username)
        })
        .collect();

    Ok(HttpResponse::Ok().json(AlarmDetailResponse {
        alarm: AlarmResponse::new(
            alarm,
            site.as_ref().map(|s| s.name.clone()),
            site.map(|s| s.code),
            region.map(|r| r.name),
        ),
        history: history_response,
    }))
}

/// Descriptive fields only; status moves through acknowledge/resolve.
#[put("/alarms/{id}")]
pub async fn update_alarm(
    path: web::Path<i32>,
    body: web::Json<AlarmUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.can_raise_work() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let alarm_id = path.into_inner();

    let alarm = AlarmEntity::find_by_id(alarm_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    let mut alarm_model: alarm::ActiveModel = alarm.into();
    if let Some(alarm_type) = body.alarm_type {
        alarm_model.alarm_type = Set(alarm_type);
    }
    if let Some(severity) = body.severity {
        alarm_model.severity = Set(severity);
    }
    if let Some(title) = &body.title {
        alarm_model.title = Set(title.clone());
    }
    if let Some(description) = &body.description {
        alarm_model.description = Set(description.clone());
    }
    alarm_model.updated_at = Set(Utc::now().into());

    let updated = alarm_model.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Cascades to the alarm's history and ticket.
#[delete("/alarms/{id}")]
pub async fn delete_alarm(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.is_admin() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let alarm_id = path.into_inner();

    let alarm = AlarmEntity::find_by_id(alarm_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    alarm.delete(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/alarms/{id}/acknowledge",
    request_body = AlarmActionRequest,
    responses(
        (status = 200, description = "Alarm acknowledged"),
        (status = 400, description = "Alarm is not active"),
    ),
)]
#[post("/alarms/{id}/acknowledge")]
pub async fn acknowledge_alarm(
    path: web::Path<i32>,
    body: web::Json<AlarmActionRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let alarm =
        service::alarm::acknowledge(db.get_ref(), path.into_inner(), &current, body.comment.clone())
            .await?;

    Ok(HttpResponse::Ok().json(alarm))
}

#[utoipa::path(
    post,
    path = "/api/alarms/{id}/resolve",
    request_body = AlarmActionRequest,
    responses(
        (status = 200, description = "Alarm resolved"),
        (status = 400, description = "Alarm is already resolved"),
    ),
)]
#[post("/alarms/{id}/resolve")]
pub async fn resolve_alarm(
    path: web::Path<i32>,
    body: web::Json<AlarmActionRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let alarm =
        service::alarm::resolve(db.get_ref(), path.into_inner(), &current, body.comment.clone())
            .await?;

    Ok(HttpResponse::Ok().json(alarm))
}

#[get("/dashboard/stats")]
pub async fn dashboard_stats(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let stats = service::stats::dashboard_stats(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(stats))
}

async fn region_name_map(db: &DatabaseConnection) -> Result<HashMap<i32, String>, AppError> {
    let regions = RegionEntity::find().all(db).await?;
    Ok(regions.into_iter().map(|r| (r.id, r.name)).collect())
}

pub(super) async fn username_map(
    db: &DatabaseConnection,
) -> Result<HashMap<i32, String>, AppError> {
    let users = UserEntity::find().all(db).await?;
    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

fn validate_alarm_request(body: &AlarmCreateRequest) -> Result<(), AppError> {
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
