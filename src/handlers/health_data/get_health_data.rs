use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::health_record::HealthRecordQuery;
use crate::services::HealthRecordService;

#[tracing::instrument(
    name = "List health data",
    skip(records, user, query),
    fields(
        username = %user.username
    )
)]
pub async fn get_health_data(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    query: web::Query<HealthRecordQuery>,
) -> Result<HttpResponse, AppError> {
    let found = records.list(user.user_id, &query).await?;
    tracing::debug!("Returning {} health records", found.len());
    Ok(HttpResponse::Ok().json(found))
}

#[tracing::instrument(
    name = "Get health record",
    skip(records, user),
    fields(
        username = %user.username
    )
)]
pub async fn get_health_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = records.get_by_id(user.user_id, &record_id).await?;
    Ok(HttpResponse::Ok().json(record))
}
