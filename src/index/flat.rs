//! Exact brute-force cosine index.

use super::{Neighbor, VectorIndex};
use crate::documents::Chunk;
use crate::embedding::{EmbeddingError, cosine_similarity};
use crate::error::RagResult;

/// Stores vectors row-major in one contiguous buffer.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    dimension: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Reassemble an index from persisted parts.
    ///
    /// Returns `None` when the vector buffer does not hold exactly one row
    /// of `dimension` values per chunk.
    pub fn from_parts(dimension: usize, chunks: Vec<Chunk>, vectors: Vec<f32>) -> Option<Self> {
        if dimension == 0 || vectors.len() != chunks.len() * dimension {
            return None;
        }
        Some(Self {
            dimension,
            chunks,
            vectors,
        })
    }

    /// Append a chunk and its embedding.
    pub fn insert(&mut self, chunk: Chunk, vector: &[f32]) -> RagResult<()> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            }
            .into());
        }
        self.chunks.push(chunk);
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Raw row-major vector buffer.
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            }
            .into());
        }

        if k == 0 || self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|row| cosine_similarity(query, row))
            .enumerate()
            .collect();

        // Stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| Neighbor {
                chunk: self.chunks[position].clone(),
                score,
            })
            .collect())
    }
}
