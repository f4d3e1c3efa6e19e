use actix_web::{get, post, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::report_handler::{generate_owner_report, generate_report, get_report_data};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::report::GenerateReportRequest;
use crate::services::ReportService;

#[post("/generate-report")]
async fn generate(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<GenerateReportRequest>,
) -> Result<HttpResponse, AppError> {
    generate_report(reports, user, request).await
}

#[get("/data")]
async fn report_data(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    get_report_data(reports, user).await
}

#[post("/generate")]
async fn generate_for_owner(
    reports: web::Data<ReportService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    generate_owner_report(reports, user).await
}
