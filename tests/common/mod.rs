//! Shared fixtures for integration tests: a small knowledge base on disk,
//! offline settings, and scripted generators.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use ragbase::generation::{ChatMessage, GenerationError, GenerationParams, Generator};
use ragbase::{Embedder, HashingEmbedder, Settings};
use tempfile::TempDir;

pub const LEAVE_POLICY: &str = "# Leave policy\n\n\
Employees get 15 vacation days per year. Unused vacation days roll over once.\n\n\
Sick leave is separate from vacation and requires a doctor's note after three days.";

pub const REMOTE_POLICY: &str = "# Remote work\n\n\
Remote work is allowed two days a week with manager approval.\n\n\
Equipment for remote work is provided by the IT department.";

pub const CAFETERIA: &str = "# Cafeteria\n\n\
The cafeteria serves lunch at noon. Coffee is free on the third floor.";

/// A temp workspace with three policy documents under `knowledge_base/`.
pub fn knowledge_base() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_doc(temp.path(), "leave.md", LEAVE_POLICY);
    write_doc(temp.path(), "hr/remote.md", REMOTE_POLICY);
    write_doc(temp.path(), "cafeteria.md", CAFETERIA);
    temp
}

pub fn write_doc(root: &Path, relative: &str, content: &str) {
    let path = root.join("knowledge_base").join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Settings rooted at `root` using the offline hashing embedder.
pub fn offline_settings(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.workspace_root = Some(root.to_path_buf());
    settings.embedding.model = HashingEmbedder::MODEL_NAME.to_string();
    settings.llm.api_key_env = "RAGBASE_TESTS_UNSET_KEY".to_string();
    settings
}

pub fn embedder(settings: &Settings) -> Arc<dyn Embedder> {
    ragbase::embedding::from_settings(&settings.embedding).unwrap()
}

/// Ingest the knowledge base under `root` and return the settings used.
pub fn ingested(root: &Path) -> Settings {
    let settings = offline_settings(root);
    ragbase::ingest(&settings, embedder(&settings), true, |_| {}).unwrap();
    settings
}

/// Replies with a fixed outcome and records every request.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.calls.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls.lock().push(messages.to_vec());
        self.reply.clone().map_err(GenerationError::Http)
    }
}
