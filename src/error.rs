//! Crate-level error type for the retrieval pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Index not found at {path}: {reason}. Run 'ragbase ingest' first")]
    IndexNotFound { path: PathBuf, reason: String },

    #[error("Index has not been built or loaded")]
    IndexNotLoaded,

    #[error("Nothing to index: no chunks were produced from the document collection")]
    EmptyCorpus,

    #[error("Index at {path} is corrupt: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error(
        "Index was built with '{index_model}' ({index_dimension} dims) but the active embedder is '{embedder_model}' ({embedder_dimension} dims)"
    )]
    EmbeddingMismatch {
        index_model: String,
        index_dimension: usize,
        embedder_model: String,
        embedder_dimension: usize,
    },

    #[error("Missing API credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Answer generation is unavailable: {0}")]
    GeneratorUnavailable(String),

    #[error("Invalid chunking configuration: {0}")]
    ChunkingConfig(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RagError {
    /// True when the failure means ingestion has never produced an index.
    pub fn is_index_missing(&self) -> bool {
        matches!(self, RagError::IndexNotFound { .. })
    }
}

pub type RagResult<T> = Result<T, RagError>;
