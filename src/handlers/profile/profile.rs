use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::SessionService;

#[tracing::instrument(
    name = "Get user profile",
    skip(sessions, user),
    fields(username = %user.username)
)]
pub async fn get_user_profile(
    sessions: web::Data<SessionService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    // A valid token can outlive its user
    let stored = sessions
        .current_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Protected route accessed successfully",
        "user": {
            "id": stored.id,
            "username": stored.username,
            "email": stored.email,
            "created_at": stored.created_at,
        }
    })))
}
