//! Grounded answer generation from retrieved context and recent history.

use std::sync::Arc;

use crate::generation::{ChatMessage, GenerationError, GenerationParams, Generator};
use crate::retrieval::RetrievedResult;
use crate::session::ConversationTurn;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about company policies. \
Provide clear, direct answers based on the context provided. \
Use natural language without markdown formatting or asterisks. \
Answer conversationally without repeatedly mentioning sources. \
If the question asks about something, use all relevant information from the context \
to give a comprehensive answer, even if it doesn't explicitly mention the exact words. \
For example, if asked about 'benefits', describe the leave policies, remote work options, etc. \
Only say information is unavailable if the context truly has nothing relevant.";

/// Turns of history included in each request.
pub const MAX_HISTORY_TURNS: usize = 5;

/// Returned by `compose` when generation fails for any reason.
pub const FALLBACK_ANSWER: &str = "I encountered an error processing your request.";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 800;

/// Render retrieved chunks as `[Source: ...]` blocks separated by blank lines.
pub fn format_context(results: &[RetrievedResult]) -> String {
    results
        .iter()
        .map(|r| format!("[Source: {}]\n{}", r.source(), r.content()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the full message list for one generation call.
///
/// Only the last `MAX_HISTORY_TURNS` entries of `history` are used, oldest first.
pub fn build_messages(
    query: &str,
    results: &[RetrievedResult],
    history: &[ConversationTurn],
) -> Vec<ChatMessage> {
    let recent = &history[history.len().saturating_sub(MAX_HISTORY_TURNS)..];

    let mut messages = Vec::with_capacity(2 + recent.len() * 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));

    for turn in recent {
        messages.push(ChatMessage::user(turn.query()));
        messages.push(ChatMessage::assistant(turn.response()));
    }

    messages.push(ChatMessage::user(format!(
        "Context:\n{}\n\nQuestion: {}",
        format_context(results),
        query
    )));
    messages
}

pub struct AnswerComposer {
    generator: Arc<dyn Generator>,
    params: GenerationParams,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            params: GenerationParams {
                model: None,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
        }
    }

    /// Generate an answer, surfacing generation failures.
    pub async fn try_compose(
        &self,
        query: &str,
        results: &[RetrievedResult],
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        let messages = build_messages(query, results, history);
        tracing::debug!(
            target: "answer",
            "generating with {} messages, {} context chunks",
            messages.len(),
            results.len()
        );
        self.generator.generate(&messages, &self.params).await
    }

    /// Generate an answer; any failure yields `FALLBACK_ANSWER`.
    pub async fn compose(
        &self,
        query: &str,
        results: &[RetrievedResult],
        history: &[ConversationTurn],
    ) -> String {
        match self.try_compose(query, results, history).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(target: "answer", "generation failed: {e}");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
