// src/middleware/auth.rs
use std::future::{ready, Ready};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::auth::jwt::{decode_token, AuthError};
use crate::config::jwt::JwtSettings;
use crate::errors::AppError;

/// Owner identity resolved from a bearer token, available to handlers as
/// `web::ReqData<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Pulls the bearer token out of the Authorization header.
pub fn bearer_token(req: &ServiceRequest) -> Result<&str, AuthError> {
    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidToken)?,
        None => return Err(AuthError::Unauthenticated),
    };

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthenticated)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::Unauthenticated);
    }
    Ok(token)
}

/// Resolve the request's bearer token to an owner identity.
pub fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_settings = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| AppError::Internal("JWT settings not registered".to_string()))?;

    let token = bearer_token(req)?;
    let claims = decode_token(token, jwt_settings)?;
    let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

    Ok(AuthenticatedUser {
        user_id,
        username: claims.username,
    })
}

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
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Fail closed: nothing downstream runs without an owner
        let user = match authenticate(&req) {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(path = %req.path(), "Rejected request: {}", e);
                return Box::pin(async move { Err(e.into()) });
            }
        };

        req.extensions_mut().insert(user);

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
