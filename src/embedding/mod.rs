//! Text embedding behind a single capability trait.
//!
//! The retrieval pipeline only ever calls `Embedder::embed`; any model can be
//! substituted as long as indexing and querying use the same one.

mod fastembed_model;
mod hashing;

pub use fastembed_model::FastEmbedder;
pub use hashing::HashingEmbedder;

use std::sync::Arc;

use crate::config::EmbeddingConfig;

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    #[error("Failed to generate embedding: {0}")]
    Generation(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Maps text to a fixed-length vector.
pub trait Embedder: Send + Sync {
    /// Name recorded in the index manifest.
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed a batch of texts. Output order matches input order.
    fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Scale a vector to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Create the embedder named in settings.
///
/// `"hashing"` selects the offline `HashingEmbedder`; anything else is
/// resolved as a fastembed model name.
pub fn from_settings(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn Embedder>> {
    if config.model.eq_ignore_ascii_case(HashingEmbedder::MODEL_NAME) {
        return Ok(Arc::new(HashingEmbedder::new(config.hashing_dimension)));
    }

    let embedder = FastEmbedder::from_settings(config)?;
    tracing::info!(
        target: "embedding",
        "loaded embedding model {} ({} dims)",
        embedder.model_name(),
        embedder.dimension()
    );
    Ok(Arc::new(embedder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Identical vectors
        let v1 = vec![1.0, 0.0, 0.0];
        let v2 = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&v1, &v2) - 1.0).abs() < 0.001);

        // Orthogonal vectors
        let v3 = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&v1, &v3) - 0.0).abs() < 0.001);

        // Opposite vectors
        let v4 = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&v1, &v4) - (-1.0)).abs() < 0.001);

        // Zero vector
        assert_eq!(cosine_similarity(&v1, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_from_settings_hashing() {
        let config = EmbeddingConfig {
            model: "hashing".to_string(),
            ..Default::default()
        };
        let embedder = from_settings(&config).unwrap();
        assert_eq!(embedder.model_name(), HashingEmbedder::MODEL_NAME);
        assert_eq!(embedder.dimension(), config.hashing_dimension);
    }
}
