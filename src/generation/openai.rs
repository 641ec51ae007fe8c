//! Chat-completions client for OpenAI-compatible APIs (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ChatMessage, GenerationError, GenerationParams, Generator};
use crate::config::LlmConfig;

pub struct OpenAiCompatibleGenerator {
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1")
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from settings, reading the key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn request_body(&self, messages: &[ChatMessage], params: &GenerationParams) -> Value {
        json!({
            "model": params.model.as_deref().unwrap_or(&self.model),
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        })
    }
}

/// Extract `choices[0].message.content` from a completion response.
fn completion_text(response: &Value) -> Result<String, GenerationError> {
    let choice = response["choices"]
        .get(0)
        .ok_or_else(|| GenerationError::Malformed("no choices in response".to_string()))?;

    choice["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| GenerationError::Malformed("choice has no message content".to_string()))
}

#[async_trait]
impl Generator for OpenAiCompatibleGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, params))
            .send()
            .await
            .map_err(|e| GenerationError::Http(format!("connection to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        completion_text(&json)
    }
}
