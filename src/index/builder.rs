//! Builds a vector index from chunks.

use std::sync::Arc;

use super::flat::FlatIndex;
use crate::documents::Chunk;
use crate::embedding::Embedder;
use crate::error::{RagError, RagResult};

/// Chunks embedded per `embed_batch` call.
const EMBED_BATCH_SIZE: usize = 64;

/// Progress report emitted after each embedded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexProgress {
    pub embedded: usize,
    pub total: usize,
}

/// Embeds chunks and collects them into a `FlatIndex`.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed every chunk and build the index.
    ///
    /// An empty chunk list is an error: an index with nothing in it would
    /// silently answer every query with no context.
    pub fn build(&self, chunks: Vec<Chunk>) -> RagResult<FlatIndex> {
        self.build_with_progress(chunks, |_| {})
    }

    /// Like `build`, reporting progress after each batch.
    pub fn build_with_progress<F>(&self, chunks: Vec<Chunk>, mut on_progress: F) -> RagResult<FlatIndex>
    where
        F: FnMut(IndexProgress),
    {
        if chunks.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        let total = chunks.len();
        let mut index = FlatIndex::new(self.embedder.dimension());
        let mut embedded = 0;

        let mut remaining = chunks.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<Chunk> = remaining.by_ref().take(EMBED_BATCH_SIZE).collect();
            let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;

            for (chunk, vector) in batch.into_iter().zip(vectors) {
                index.insert(chunk, &vector)?;
            }

            embedded = index.chunks().len();
            on_progress(IndexProgress { embedded, total });
        }

        tracing::info!(
            target: "ingest",
            "indexed {} chunks with {} ({} dims)",
            embedded,
            self.embedder.model_name(),
            self.embedder.dimension()
        );
        Ok(index)
    }
}
