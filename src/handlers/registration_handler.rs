use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::auth::AuthResponse;
use crate::models::user::{RegistrationRequest, UserResponse};
use crate::services::SessionService;

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show arguments
    skip(user_form, sessions),
    fields(
        username = %user_form.username,
        email = %user_form.email
    )
)]
pub async fn register_user(
    user_form: web::Json<RegistrationRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let session = sessions.register(&user_form).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        token: session.token,
        user: UserResponse::from(&session.user),
    }))
}
