use actix_web::{get, put, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::profile::health_profile::{get_health_profile, update_health_profile};
use crate::handlers::profile::profile::get_user_profile;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::profile::UpdateHealthProfileRequest;
use crate::services::{ProfileService, SessionService};

#[get("")]
async fn get_user(
    sessions: web::Data<SessionService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    get_user_profile(sessions, user).await
}

#[get("")]
async fn get_health_prof(
    profiles: web::Data<ProfileService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    get_health_profile(profiles, user).await
}

#[put("")]
async fn update_health_prof(
    profiles: web::Data<ProfileService>,
    user: web::ReqData<AuthenticatedUser>,
    data: web::Json<UpdateHealthProfileRequest>,
) -> Result<HttpResponse, AppError> {
    update_health_profile(profiles, user, data).await
}
