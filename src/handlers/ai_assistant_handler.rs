use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::assistant::{ChatRequest, ChatResponse};
use crate::services::AssistantService;

#[derive(Debug, MultipartForm)]
pub struct DocumentUploadForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

#[tracing::instrument(
    name = "Assistant chat",
    skip(assistant, user, request),
    fields(username = %user.username)
)]
pub async fn chat(
    assistant: web::Data<AssistantService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    let reply = assistant.chat(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ChatResponse { reply }))
}

#[tracing::instrument(
    name = "Analyze uploaded document",
    skip(assistant, user, form),
    fields(username = %user.username)
)]
pub async fn upload_document(
    assistant: web::Data<AssistantService>,
    user: web::ReqData<AuthenticatedUser>,
    form: MultipartForm<DocumentUploadForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let file_name = form.file.file_name.clone().unwrap_or_else(|| "document".to_string());
    let content_type = form.file.content_type.as_ref().map(|mime| mime.essence_str().to_string());
    tracing::info!(size = form.file.size, content_type = ?content_type, "Received document");

    let bytes = tokio::fs::read(form.file.file.path()).await.map_err(|e| {
        AppError::Internal(format!("Failed to read uploaded file: {}", e))
    })?;

    let analysis = assistant
        .analyze_document(&file_name, content_type.as_deref(), &bytes)
        .await?;
    Ok(HttpResponse::Ok().json(analysis))
}
