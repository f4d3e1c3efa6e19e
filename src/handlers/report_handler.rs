use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::report::GenerateReportRequest;
use crate::services::ReportService;

/// Caller supplies both snapshots.
#[tracing::instrument(
    name = "Generate report from supplied data",
    skip(reports, user, request),
    fields(username = %user.username)
)]
pub async fn generate_report(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<GenerateReportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let generated = reports
        .builder()
        .generate(request.health_data, request.patient_info)
        .await?;
    Ok(HttpResponse::Ok().json(generated))
}

#[tracing::instrument(
    name = "Get health report data",
    skip(reports, user),
    fields(username = %user.username)
)]
pub async fn get_report_data(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let snapshot = reports.snapshots().snapshot(user.user_id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Snapshot and profile come from the caller's stored data.
#[tracing::instrument(
    name = "Generate report for owner",
    skip(reports, user),
    fields(username = %user.username)
)]
pub async fn generate_owner_report(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let generated = reports.generate_for_owner(user.user_id).await?;
    Ok(HttpResponse::Ok().json(generated))
}
