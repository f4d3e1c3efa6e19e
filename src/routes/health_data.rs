use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::health_data::get_health_data::{get_health_data, get_health_record};
use crate::handlers::health_data::update_health_data::{
    delete_health_record, patch_health_record, replace_health_record,
};
use crate::handlers::health_data::upload_health_data::upload_health_data;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::health_record::{
    CreateHealthRecordRequest, HealthRecordQuery, PatchHealthRecordRequest,
    ReplaceHealthRecordRequest,
};
use crate::services::HealthRecordService;

#[get("")]
async fn list_records(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    query: web::Query<HealthRecordQuery>,
) -> Result<HttpResponse, AppError> {
    get_health_data(records, user, query).await
}

#[post("")]
async fn create_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    data: web::Json<CreateHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    upload_health_data(records, user, data).await
}

#[get("/{id}")]
async fn get_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    get_health_record(records, user, record_id).await
}

#[put("/{id}")]
async fn replace_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
    data: web::Json<ReplaceHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    replace_health_record(records, user, record_id, data).await
}

#[patch("/{id}")]
async fn patch_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
    data: web::Json<PatchHealthRecordRequest>,
) -> Result<HttpResponse, AppError> {
    patch_health_record(records, user, record_id, data).await
}

#[delete("/{id}")]
async fn delete_record(
    records: web::Data<HealthRecordService>,
    user: web::ReqData<AuthenticatedUser>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    delete_health_record(records, user, record_id).await
}
