use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::auth::jwt::AuthError;
use crate::db::StoreError;

/// Request-boundary error. Every component error converts into one of
/// these; the body is always `{"error": <reason>, "message": <text>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { reason: &'static str, message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict { reason: &'static str, message: String },

    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("{message}")]
    Upstream { reason: &'static str, message: String, remote: bool },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::BadRequest { reason: "validation_error", message: message.into() }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            AppError::BadRequest { reason, .. } => *reason,
            AppError::Auth(e) => e.reason(),
            AppError::NotFound(_) => "not_found",
            AppError::Conflict { reason, .. } => *reason,
            AppError::UnsupportedMedia(_) => "unsupported_document",
            AppError::Upstream { reason, .. } => *reason,
            AppError::Store(_) | AppError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Driver and internal details stay in the logs
            AppError::Store(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Upstream { remote: true, .. } => StatusCode::BAD_GATEWAY,
            AppError::Upstream { remote: false, .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.reason(),
            "message": self.public_message(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Auth(AuthError::Expired).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict { reason: "duplicate_identity", message: "x".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Upstream { reason: "upstream_error", message: "x".into(), remote: true }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Upstream { reason: "malformed_ai_response", message: "x".into(), remote: false }
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn store_errors_hide_driver_details() {
        let error = AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn auth_errors_carry_machine_reason() {
        let response = AppError::Auth(AuthError::Expired).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "token_expired");
    }
}
