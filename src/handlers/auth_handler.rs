// src/handlers/auth_handler.rs
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::auth::{AuthResponse, LoginRequest};
use crate::models::user::UserResponse;
use crate::services::SessionService;

#[tracing::instrument(
    name = "Login user attempt",
    skip(login_form, sessions),
    fields(
        username = %login_form.username
    )
)]
pub async fn login_user(
    login_form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let session = sessions.login(&login_form).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token: session.token,
        user: UserResponse::from(&session.user),
    }))
}
