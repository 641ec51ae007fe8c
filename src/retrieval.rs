//! Query-time similarity retrieval.

use std::sync::Arc;

use crate::documents::Chunk;
use crate::embedding::Embedder;
use crate::error::{RagError, RagResult};
use crate::index::VectorIndex;

/// A retrieved chunk with its rank and similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedResult {
    /// 1-based position in the ranking
    pub rank: usize,
    pub score: f32,
    pub chunk: Chunk,
}

impl RetrievedResult {
    pub fn source(&self) -> &str {
        &self.chunk.source
    }

    pub fn content(&self) -> &str {
        &self.chunk.content
    }
}

/// Embeds queries and searches the index with the same embedder used to build it.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index: Some(index),
        }
    }

    /// A retriever with no index attached. Every query fails with `IndexNotLoaded`.
    pub fn unloaded(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            index: None,
        }
    }

    /// Number of indexed chunks, zero when no index is attached.
    pub fn indexed_chunks(&self) -> usize {
        self.index.as_ref().map_or(0, |index| index.len())
    }

    /// The `k` chunks most similar to `query`, ranked from 1.
    pub fn retrieve(&self, query: &str, k: usize) -> RagResult<Vec<RetrievedResult>> {
        let index = self.index.as_ref().ok_or(RagError::IndexNotLoaded)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query)?;
        let neighbors = index.search(&query_vector, k)?;

        tracing::debug!(
            target: "retrieval",
            "retrieved {} of {} chunks for query ({} chars)",
            neighbors.len(),
            index.len(),
            query.chars().count()
        );

        Ok(neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| RetrievedResult {
                rank: i + 1,
                score: neighbor.score,
                chunk: neighbor.chunk,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::index::Indexer;

    fn retriever() -> Retriever {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
        let chunks = [
            ("leave.md", "Employees get 15 vacation days per year."),
            ("remote.md", "Remote work is allowed two days a week."),
            ("cafeteria.md", "The cafeteria serves lunch at noon."),
        ]
        .iter()
        .map(|(source, text)| Chunk::new(*source, 0, (0, text.len()), *text))
        .collect();

        let index = Indexer::new(embedder.clone()).build(chunks).unwrap();
        Retriever::new(embedder, Arc::new(index))
    }

    #[test]
    fn test_retrieve_ranks_from_one() {
        let results = retriever().retrieve("how many vacation days", 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source(), "leave.md");
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_k_larger_than_index() {
        assert_eq!(retriever().retrieve("lunch", 10).unwrap().len(), 3);
        assert!(retriever().retrieve("lunch", 0).unwrap().is_empty());
    }

    #[test]
    fn test_unloaded_index_is_error() {
        let retriever = Retriever::unloaded(Arc::new(HashingEmbedder::default()));
        assert_eq!(retriever.indexed_chunks(), 0);
        assert!(matches!(
            retriever.retrieve("anything", 3),
            Err(RagError::IndexNotLoaded)
        ));
    }
}
