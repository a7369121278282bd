use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::region::{self, Entity as RegionEntity};
use crate::entity::site::{self, Entity as SiteEntity, SiteStatus};
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};
use crate::model::site::{
    RegionResponse, SiteCreateRequest, SiteListQuery, SiteResponse, SiteUpdateRequest,
};

#[get("/regions")]
pub async fn list_regions(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let regions = RegionEntity::find()
        .order_by_asc(region::Column::Name)
        .all(db.get_ref())
        .await?;
    let sites = SiteEntity::find().all(db.get_ref()).await?;

    let response: Vec<RegionResponse> = regions
        .into_iter()
        .map(|r| {
            let site_count = sites.iter().filter(|s| s.region_id == r.id).count();
            RegionResponse::new(r, site_count)
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/sites",
    responses(
        (status = 200, description = "Sites with their region", body = Vec<SiteResponse>),
    ),
)]
#[get("/sites")]
pub async fn list_sites(
    db: web::Data<DatabaseConnection>,
    query: web::Query<SiteListQuery>,
) -> Result<HttpResponse, AppError> {
    let mut finder = SiteEntity::find()
        .find_also_related(RegionEntity)
        .order_by_asc(site::Column::Name);

    if let Some(region_id) = query.region {
        finder = finder.filter(site::Column::RegionId.eq(region_id));
    }
    if let Some(status) = query.status {
        finder = finder.filter(site::Column::Status.eq(status));
    }

    let sites = finder.all(db.get_ref()).await?;

    let response: Vec<SiteResponse> = sites
        .into_iter()
        .map(|(s, r)| SiteResponse::new(s, r.map(|r| r.name)))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

#[post("/sites")]
pub async fn create_site(
    body: web::Json<SiteCreateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.can_manage_inventory() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    validate_site_request(&body)?;

    let region = RegionEntity::find_by_id(body.region_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::RegionNotFound))?;

    let now = Utc::now();
    let new_site = site::ActiveModel {
        name: Set(body.name.clone()),
        code: Set(body.code.clone()),
        region_id: Set(body.region_id),
        latitude: Set(body.latitude),
        longitude: Set(body.longitude),
        status: Set(body.status.unwrap_or(SiteStatus::Active)),
        ip_address: Set(body.ip_address.clone()),
        last_ping: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = new_site.insert(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(SiteResponse::new(inserted, Some(region.name))))
}

#[get("/sites/{id}")]
pub async fn get_site(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let site_id = path.into_inner();

    let (site, region) = SiteEntity::find_by_id(site_id)
        .find_also_related(RegionEntity)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SiteNotFound))?;

    Ok(HttpResponse::Ok().json(SiteResponse::new(site, region.map(|r| r.name))))
}

#[put("/sites/{id}")]
pub async fn update_site(
    path: web::Path<i32>,
    body: web::Json<SiteUpdateRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.can_manage_inventory() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let site_id = path.into_inner();

    let site = SiteEntity::find_by_id(site_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SiteNotFound))?;

    if let Some(region_id) = body.region_id {
        RegionEntity::find_by_id(region_id)
            .one(db.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found(ErrorCode::RegionNotFound))?;
    }

    let mut site_model: site::ActiveModel = site.into();
    if let Some(name) = &body.name {
        site_model.name = Set(name.clone());
    }
    if let Some(region_id) = body.region_id {
        site_model.region_id = Set(region_id);
    }
    if let Some(latitude) = body.latitude {
        site_model.latitude = Set(latitude);
    }
    if let Some(longitude) = body.longitude {
        site_model.longitude = Set(longitude);
    }
    if let Some(status) = body.status {
        site_model.status = Set(status);
    }
    if let Some(ip_address) = &body.ip_address {
        site_model.ip_address = Set(ip_address.clone());
    }
    if let Some(last_ping) = body.last_ping {
        site_model.last_ping = Set(Some(last_ping.into()));
    }
    site_model.updated_at = Set(Utc::now().into());

    let updated = site_model.update(db.get_ref()).await?;

    let region = RegionEntity::find_by_id(updated.region_id)
        .one(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SiteResponse::new(updated, region.map(|r| r.name))))
}

/// Deleting a site cascades to its alarms and their history.
#[delete("/sites/{id}")]
pub async fn delete_site(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.is_admin() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    let site_id = path.into_inner();

    let site = SiteEntity::find_by_id(site_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::SiteNotFound))?;

    site.delete(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

fn validate_site_request(body: &SiteCreateRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if body.name.trim().is_empty() {
        errors.push(ValidationFieldError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }

    if body.code.trim().is_empty() {
        errors.push(ValidationFieldError {
            field: "code".to_string(),
            message: "Code is required".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}
