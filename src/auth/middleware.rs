use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use super::jwt::{JwtUtils, TokenVerifyResult};
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode};

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        let auth_result = match auth_header {
            Some(header_value) => {
                let auth_str = header_value.to_str().unwrap_or("");
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    match JwtUtils::verify_token(token) {
                        TokenVerifyResult::Valid(claims) => {
                            match claims.sub.parse::<i32>() {
                                Ok(user_id) => {
                                    req.extensions_mut().insert(CurrentUser {
                                        id: user_id,
                                        role: claims.role,
                                        team_id: claims.team,
                                    });
                                    Ok(())
                                }
                                Err(_) => Err(AppError::unauthorized(ErrorCode::InvalidAuthToken)),
                            }
                        }
                        TokenVerifyResult::Expired => {
                            Err(AppError::unauthorized(ErrorCode::ExpiredAuthToken))
                        }
                        TokenVerifyResult::Invalid => {
                            Err(AppError::unauthorized(ErrorCode::InvalidAuthToken))
                        }
                    }
                } else {
                    Err(AppError::unauthorized(ErrorCode::AuthenticationFailed))
                }
            }
            None => Err(AppError::unauthorized(ErrorCode::AuthenticationFailed)),
        };

        let fut = self.service.call(req);
        Box::pin(async move {
            match auth_result {
                Ok(_) => fut.await,
                Err(e) => Err(e.into()),
            }
        })
    }
}
