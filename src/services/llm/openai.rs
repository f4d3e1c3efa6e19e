use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::llm::LlmSettings;
use crate::models::llm::{ChatMessage, LlmError};
use crate::services::llm::{send_error, status_error, trim_base_url, LlmClient};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, settings: &LlmSettings) -> Self {
        Self {
            client,
            base_url: trim_base_url(&settings.base_url),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }
}

fn first_choice(body: CompletionResponse) -> Result<String, LlmError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("No completion choices".to_string()))?;

    if content.trim().is_empty() {
        return Err(LlmError::InvalidResponse("Empty content".to_string()));
    }
    Ok(content)
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, messages = messages.len(), "Calling chat completions");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature: 0.3,
            })
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: CompletionResponse = response.json().await.map_err(send_error)?;
        first_choice(body)
    }
}
