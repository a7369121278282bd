use actix_web::{HttpResponse, get, post, web};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;

use crate::auth::jwt::JwtUtils;
use crate::entity::team::{self, Entity as TeamEntity};
use crate::entity::user::{self, Entity as UserEntity};
use crate::model::auth::{CreateUserRequest, CurrentUser, LoginRequest, LoginResponse, UserResponse};
use crate::model::global_error::{AppError, ErrorCode, ValidationFieldError};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials"),
    ),
)]
#[post("/auth/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    validate_login_request(&body.username, &body.password)?;

    let user = UserEntity::find()
        .filter(user::Column::Username.eq(&body.username))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::bad_request(ErrorCode::InvalidCredentials))?;

    if !user.is_active {
        return Err(AppError::bad_request(ErrorCode::InvalidCredentials));
    }

    let is_valid = verify(&body.password, &user.password)
        .map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    if !is_valid {
        return Err(AppError::bad_request(ErrorCode::InvalidCredentials));
    }

    let token = JwtUtils::generate_token(&user)?;

    tracing::info!(user_id = user.id, "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Tokens are stateless; logout exists so clients have a uniform endpoint to
/// call when discarding theirs.
#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Logged out successfully" }))
}

#[get("/auth/profile")]
pub async fn get_profile(
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let user = UserEntity::find_by_id(current.id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::UserNotFound))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Admins see everyone; other roles only themselves.
#[get("/users")]
pub async fn list_users(
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let mut query = UserEntity::find().order_by_asc(user::Column::Username);
    if !current.role.is_admin() {
        query = query.filter(user::Column::Id.eq(current.id));
    }

    let users = query.all(db.get_ref()).await?;
    let response: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

#[post("/users")]
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
    current: web::ReqData<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    if !current.role.is_admin() {
        return Err(AppError::forbidden(ErrorCode::NotEnoughPermission));
    }

    validate_create_user_request(&body)?;

    let existing = UserEntity::find()
        .filter(user::Column::Username.eq(&body.username))
        .one(db.get_ref())
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict(ErrorCode::DuplicateUsername));
    }

    if let Some(team_id) = body.team_id {
        TeamEntity::find_by_id(team_id)
            .one(db.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found(ErrorCode::TeamNotFound))?;
    }

    let hashed_password = hash(&body.password, DEFAULT_COST)
        .map_err(|_| AppError::internal_error(ErrorCode::InternalError))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(body.username.clone()),
        email: Set(body.email.clone()),
        password: Set(hashed_password),
        role: Set(body.role),
        phone: Set(body.phone.clone()),
        team_id: Set(body.team_id),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = new_user.insert(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(inserted)))
}

#[get("/teams")]
pub async fn list_teams(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let teams = TeamEntity::find()
        .filter(team::Column::IsActive.eq(true))
        .order_by_asc(team::Column::Name)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(teams))
}

fn validate_login_request(username: &str, password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push(ValidationFieldError {
            field: "username".to_string(),
            message: "Username is required".to_string(),
        });
    }

    if password.is_empty() {
        errors.push(ValidationFieldError {
            field: "password".to_string(),
            message: "Password is required".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

fn validate_create_user_request(body: &CreateUserRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if body.username.trim().is_empty() {
        errors.push(ValidationFieldError {
            field: "username".to_string(),
            message: "Username is required".to_string(),
        });
    }

    if body.email.trim().is_empty() || !body.email.contains('@') {
        errors.push(ValidationFieldError {
            field: "email".to_string(),
            message: "A valid email address is required".to_string(),
        });
    }

    if body.password.len() < 8 {
        errors.push(ValidationFieldError {
            field: "password".to_string(),
            message: "Password must be at least 8 characters".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}
