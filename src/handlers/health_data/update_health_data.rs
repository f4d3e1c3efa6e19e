use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::health_record::{PatchHealthRecordRequest, ReplaceHealthRecordRequest};
use crate::services::HealthRecordService;

#[tracing::instrument(
    name = "Replace health record",
    skip(records, user, body),
    fields(username = %user.username)
)]
pub async fn replace_health_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
    body: web::Json<ReplaceHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .update_replace(user.user_id, &record_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

#[tracing::instrument(
    name = "Patch health record",
    skip(records, user, body),
    fields(username = %user.username)
)]
pub async fn patch_health_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
    body: web::Json<PatchHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .update_patch(user.user_id, &record_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

#[tracing::instrument(
    name = "Delete health record",
    skip(records, user),
    fields(username = %user.username)
)]
pub async fn delete_health_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    records.remove(user.user_id, &record_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
