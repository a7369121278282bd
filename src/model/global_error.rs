use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidTransition,
    InvalidCredentials,

    // 401 UNAUTHORIZED
    AuthenticationFailed,
    ExpiredAuthToken,
    InvalidAuthToken,

    // 403 FORBIDDEN
    NotEnoughPermission,

    // 404 NOT FOUND
    UserNotFound,
    TeamNotFound,
    RegionNotFound,
    SiteNotFound,
    AlarmNotFound,
    TicketNotFound,

    // 409 CONFLICT
    DuplicateTicket,
    DuplicateUsername,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    TokenGenerationFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::InvalidTransition => "Status change is not allowed from the current state",
            ErrorCode::InvalidCredentials => "Invalid username or password",

            ErrorCode::AuthenticationFailed => "Authentication failed",
            ErrorCode::ExpiredAuthToken => "Authentication token has expired",
            ErrorCode::InvalidAuthToken => "Authentication token is invalid",

            ErrorCode::NotEnoughPermission => "Not enough permission for this operation",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::TeamNotFound => "Team not found",
            ErrorCode::RegionNotFound => "Region not found",
            ErrorCode::SiteNotFound => "Site not found",
            ErrorCode::AlarmNotFound => "Alarm not found",
            ErrorCode::TicketNotFound => "Ticket not found",

            ErrorCode::DuplicateTicket => "A ticket already exists for this alarm",
            ErrorCode::DuplicateUsername => "Username is already taken",

            ErrorCode::DatabaseError => "A database error occurred",
            ErrorCode::InternalError => "An internal server error occurred",
            ErrorCode::TokenGenerationFailed => "Failed to generate token",
        }
    }

    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ErrorCode::ValidationError
            | ErrorCode::InvalidTransition
            | ErrorCode::InvalidCredentials => StatusCode::BAD_REQUEST,

            ErrorCode::AuthenticationFailed
            | ErrorCode::ExpiredAuthToken
            | ErrorCode::InvalidAuthToken => StatusCode::UNAUTHORIZED,

            ErrorCode::NotEnoughPermission => StatusCode::FORBIDDEN,

            ErrorCode::UserNotFound
            | ErrorCode::TeamNotFound
            | ErrorCode::RegionNotFound
            | ErrorCode::SiteNotFound
            | ErrorCode::AlarmNotFound
            | ErrorCode::TicketNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateTicket | ErrorCode::DuplicateUsername => StatusCode::CONFLICT,

            ErrorCode::DatabaseError
            | ErrorCode::InternalError
            | ErrorCode::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),

    #[error("validation failed")]
    ValidationError(Vec<ValidationFieldError>),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn conflict(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn internal_error(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn field(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![ValidationFieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        log::error!("database error: {}", err);
        AppError::new(ErrorCode::DatabaseError)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        log::error!("token generation error: {}", err);
        AppError::new(ErrorCode::TokenGenerationFailed)
    }
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationFieldError>>,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ApiError(code, detail) => {
                let response = ErrorResponse {
                    code: format!("{:?}", code),
                    message: code.message().to_string(),
                    detail: detail.clone(),
                    errors: None,
                };

                HttpResponse::build(code.status_code()).json(response)
            }
            AppError::ValidationError(errors) => {
                let response = ErrorResponse {
                    code: format!("{:?}", ErrorCode::ValidationError),
                    message: ErrorCode::ValidationError.message().to_string(),
                    detail: None,
                    errors: Some(errors.clone()),
                };

                HttpResponse::build(ErrorCode::ValidationError.status_code()).json(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn error_codes_map_to_expected_status() {
        assert_eq!(ErrorCode::InvalidTransition.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::DuplicateTicket.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TicketNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::NotEnoughPermission.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_carries_field_detail() {
        let err = AppError::field("comment", "Comment is required");
        match err {
            AppError::ValidationError(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "comment");
            }
            _ => panic!("expected validation error"),
        }
    }
}
