use actix_web::{post, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::registration_handler::register_user;
use crate::models::user::RegistrationRequest;
use crate::services::SessionService;

#[post("/register")]
async fn register(
    user_form: web::Json<RegistrationRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    register_user(user_form, sessions).await
}
