//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod chat;
pub mod ingest;
pub mod init;
pub mod search;
pub mod serve;
pub mod status;

use std::sync::Arc;

use anyhow::Context;

use crate::config::Settings;
use crate::embedding::{self, Embedder};
use crate::generation::{GenerationError, Generator, OpenAiCompatibleGenerator};

/// Create the configured embedder, downloading the model on first use.
pub(crate) fn load_embedder(settings: &Settings) -> anyhow::Result<Arc<dyn Embedder>> {
    embedding::from_settings(&settings.embedding)
        .with_context(|| format!("failed to load embedding model '{}'", settings.embedding.model))
}

/// Create the configured generator. Fails when the API key variable is unset.
pub(crate) fn load_generator(settings: &Settings) -> Result<Arc<dyn Generator>, GenerationError> {
    let generator = OpenAiCompatibleGenerator::from_config(&settings.llm)?;
    Ok(Arc::new(generator))
}
