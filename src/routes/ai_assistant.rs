use actix_multipart::form::MultipartForm;
use actix_web::{post, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::ai_assistant_handler::{chat, upload_document, DocumentUploadForm};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::assistant::ChatRequest;
use crate::services::AssistantService;

#[post("/chat")]
async fn assistant_chat(
    assistant: web::Data<AssistantService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    chat(assistant, user, request).await
}

#[post("/upload")]
async fn assistant_upload(
    assistant: web::Data<AssistantService>,
    user: web::ReqData<AuthenticatedUser>,
    form: MultipartForm<DocumentUploadForm>,
) -> Result<HttpResponse, AppError> {
    upload_document(assistant, user, form).await
}
