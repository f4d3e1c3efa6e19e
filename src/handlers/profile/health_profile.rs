use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::profile::UpdateHealthProfileRequest;
use crate::services::ProfileService;

#[tracing::instrument(
    name = "Get health profile",
    skip(profiles, user),
    fields(username = %user.username)
)]
pub async fn get_health_profile(
    profiles: web::Data<ProfileService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let profile = profiles.get(user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[tracing::instrument(
    name = "Update health profile",
    skip(profiles, user, profile_data),
    fields(username = %user.username)
)]
pub async fn update_health_profile(
    profiles: web::Data<ProfileService>,
    user: web::ReqData<AuthenticatedUser>,
    profile_data: web::Json<UpdateHealthProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = profiles
        .upsert(user.user_id, profile_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
