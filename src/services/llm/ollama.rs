use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::llm::LlmSettings;
use crate::models::llm::{ChatMessage, LlmError};
use crate::services::llm::{send_error, status_error, trim_base_url, LlmClient};

/// Local Ollama server, `/api/chat` endpoint with streaming off.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model_name: String,
}

impl OllamaClient {
    pub fn new(client: Client, settings: &LlmSettings) -> Self {
        Self {
            client,
            base_url: trim_base_url(&settings.base_url),
            model_name: settings.model.clone(),
        }
    }
}

fn message_content(body: &serde_json::Value) -> Result<String, LlmError> {
    let content = body["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::InvalidResponse("No response content".to_string()))?;
    if content.trim().is_empty() {
        return Err(LlmError::InvalidResponse("Empty content".to_string()));
    }
    Ok(content.to_string())
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = json!({
            "model": self.model_name,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": 0.3,
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            if response.status().as_u16() == 404 {
                return Err(LlmError::InvalidResponse(format!(
                    "Model not found: {}",
                    self.model_name
                )));
            }
            return Err(status_error(response).await);
        }

        let body: serde_json::Value = response.json().await.map_err(send_error)?;
        message_content(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_content_is_extracted() {
        let body = json!({"model": "llama3", "message": {"role": "assistant", "content": "Hi"}, "done": true});
        assert_eq!(message_content(&body).unwrap(), "Hi");
    }

    #[test]
    fn missing_message_is_invalid() {
        let body = json!({"error": "boom"});
        assert!(matches!(message_content(&body), Err(LlmError::InvalidResponse(_))));
    }
}
