use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::health_record::CreateHealthRecordRequest;
use crate::services::HealthRecordService;

#[tracing::instrument(
    name = "Upload health data",
    skip(records, user, record_form),
    fields(
        username = %user.username
    )
)]
pub async fn upload_health_data(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_form: web::Json<CreateHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .create(user.user_id, record_form.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(record))
}
