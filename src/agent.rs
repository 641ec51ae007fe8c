//! Conversational agent: retrieval plus answer generation with memory.

use crate::answer::{AnswerComposer, MAX_HISTORY_TURNS};
use crate::documents::source_file_name;
use crate::error::{RagError, RagResult};
use crate::pipeline::RagPipeline;
use crate::retrieval::{RetrievedResult, Retriever};
use crate::session::ConversationSession;

/// Words that end the interactive loop (case-insensitive).
pub const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];

/// Word that forgets the conversation so far (case-insensitive).
pub const CLEAR_COMMAND: &str = "clear";

/// One answered query.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub query: String,
    pub response: String,
    pub sources: Vec<RetrievedResult>,
}

impl ChatReply {
    /// Response with markdown emphasis removed.
    pub fn display_text(&self) -> String {
        strip_emphasis(&self.response)
    }

    /// Unique source file names, sorted.
    pub fn source_names(&self) -> Vec<String> {
        unique_source_names(&self.sources)
    }
}

/// Owns one conversation session and answers queries against the index.
pub struct RagAgent {
    retriever: Retriever,
    composer: AnswerComposer,
    session: ConversationSession,
    top_k: usize,
}

impl RagAgent {
    pub fn new(retriever: Retriever, composer: AnswerComposer, top_k: usize) -> Self {
        Self {
            retriever,
            composer,
            session: ConversationSession::new(),
            top_k,
        }
    }

    /// Build an agent from a loaded pipeline. The pipeline must have a generator.
    pub fn from_pipeline(pipeline: RagPipeline) -> RagResult<Self> {
        let (retriever, composer, top_k) = pipeline.into_parts();
        let composer = composer.ok_or_else(|| {
            RagError::GeneratorUnavailable("the chat agent needs a text-generation service".to_string())
        })?;
        Ok(Self::new(retriever, composer, top_k))
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Forget every recorded turn. Later answers start without history.
    pub fn clear_history(&mut self) {
        self.session.clear();
    }

    /// Answer `query` and record the exchange.
    ///
    /// Retrieval failures degrade to an empty context; generation failures
    /// yield the fallback answer. Either way the turn is recorded.
    pub async fn chat(&mut self, query: &str) -> ChatReply {
        let sources = match self.retriever.retrieve(query, self.top_k) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(target: "agent", "retrieval failed, answering without context: {e}");
                Vec::new()
            }
        };

        let response = self
            .composer
            .compose(query, &sources, self.session.recent_window(MAX_HISTORY_TURNS))
            .await;

        self.session.record(query, response.clone());
        crate::debug_event!("agent", "turn recorded", "{} turns", self.session.len());

        ChatReply {
            query: query.to_string(),
            response,
            sources,
        }
    }
}

/// True for the words that end an interactive session.
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|cmd| input.eq_ignore_ascii_case(cmd))
}

pub fn is_clear_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CLEAR_COMMAND)
}

/// Remove markdown bold and italic markers.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace('*', "")
}

/// Unique source file names (directories stripped), sorted.
pub fn unique_source_names(results: &[RetrievedResult]) -> Vec<String> {
    let mut names: Vec<String> = results
        .iter()
        .map(|r| source_file_name(r.source()).to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}
