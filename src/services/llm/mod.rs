//! Completion collaborators. Everything that talks to a hosted model goes
//! through [`LlmClient`] so the report builder and the assistant can be
//! exercised against a scripted client.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::config::llm::{LlmProvider, LlmSettings};
use crate::models::llm::{ChatMessage, LlmError};

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model_name(&self) -> &str;

    /// Single attempt, no retry. Returns the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

pub fn build_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmError> {
    let http = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    let client: Arc<dyn LlmClient> = match settings.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(http, settings)),
        LlmProvider::Ollama => Arc::new(OllamaClient::new(http, settings)),
    };
    tracing::info!(model = client.model_name(), "LLM client configured");
    Ok(client)
}

pub(crate) fn send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::NetworkError(e)
    }
}

/// Maps a non-success upstream status onto the error taxonomy.
pub(crate) async fn status_error(response: Response) -> LlmError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    tracing::error!("LLM API error {}: {}", status, error_text);

    match status.as_u16() {
        429 => LlmError::RateLimited,
        500..=599 => LlmError::ServiceUnavailable(error_text),
        _ => LlmError::InvalidResponse(format!("HTTP {}: {}", status, error_text)),
    }
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
