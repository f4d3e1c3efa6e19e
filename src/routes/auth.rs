use actix_web::{post, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::auth_handler::login_user;
use crate::models::auth::LoginRequest;
use crate::services::SessionService;

#[post("/login")]
async fn login(
    login_form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    login_user(login_form, sessions).await
}
