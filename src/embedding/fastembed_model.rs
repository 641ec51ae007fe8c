//! Sentence-transformer embeddings via fastembed (ONNX Runtime, CPU).

use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use super::{Embedder, EmbeddingError, EmbeddingResult};
use crate::config::EmbeddingConfig;

/// Embedder backed by a local fastembed model.
///
/// Vectors are L2-normalized by the model, so cosine similarity and dot
/// product rank identically.
pub struct FastEmbedder {
    /// The embedding model (Mutex because fastembed's embed needs `&mut`)
    model: Mutex<TextEmbedding>,

    /// Canonical model name, recorded in the index manifest
    model_name: String,

    /// Model dimensions for validation
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl FastEmbedder {
    /// Load the model named in settings, downloading it on first use.
    pub fn from_settings(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let (model, model_name) = parse_model(&config.model)?;
        let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(config.show_download_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Get dimensions by generating a test embedding
        let probe = text_model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        let dimension = probe
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| EmbeddingError::ModelInit("model returned no embedding".to_string()))?;

        Ok(Self {
            model: Mutex::new(text_model),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Generation("model returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }
}

/// Resolve a configured model name to a fastembed model and its canonical name.
fn parse_model(name: &str) -> EmbeddingResult<(EmbeddingModel, &'static str)> {
    let normalized = name.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "allminilml6v2" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok((EmbeddingModel::AllMiniLML6V2, "AllMiniLML6V2"))
        }
        "allminilml12v2" | "all-minilm-l12-v2" | "sentence-transformers/all-minilm-l12-v2" => {
            Ok((EmbeddingModel::AllMiniLML12V2, "AllMiniLML12V2"))
        }
        "bgesmallenv15" | "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => {
            Ok((EmbeddingModel::BGESmallENV15, "BGESmallENV15"))
        }
        "bgebaseenv15" | "bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => {
            Ok((EmbeddingModel::BGEBaseENV15, "BGEBaseENV15"))
        }
        "multilinguale5small" | "multilingual-e5-small" | "intfloat/multilingual-e5-small" => {
            Ok((EmbeddingModel::MultilingualE5Small, "MultilingualE5Small"))
        }
        _ => Err(EmbeddingError::UnknownModel(name.to_string())),
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ragbase")
        .join("models")
}
