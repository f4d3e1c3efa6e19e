use serde::Deserialize;
use secrecy::SecretString;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub system_prompt: String,
    pub timeout_seconds: u64,
}

impl LlmSettings {
    pub fn new(provider: LlmProvider, base_url: String, api_key: SecretString, model: String) -> Self {
        Self {
            provider,
            base_url,
            api_key,
            model,
            system_prompt: "You are a helpful medical AI assistant.".to_string(),
            timeout_seconds: 60,
        }
    }
}
