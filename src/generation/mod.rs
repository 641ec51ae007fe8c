//! Text generation behind a single capability trait.

mod openai;

pub use openai::OpenAiCompatibleGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for generation calls
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API key missing: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed generation response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Overrides the generator's configured model when set
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Produces a completion for an ordered list of chat messages.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;
}
