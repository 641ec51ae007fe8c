//! Document loading and chunking for the retrieval pipeline.
//!
//! This module provides:
//! - Discovery of source documents under the knowledge base directory
//! - Recursive, overlapping chunking sized for embedding
//! - The `Document` and `Chunk` types carried through indexing and retrieval

pub mod chunker;
pub mod config;
pub mod loader;
pub mod types;

pub use chunker::{Chunker, RawChunk, RecursiveChunker};
pub use config::{ChunkingConfig, DocumentsConfig};
pub use loader::DocumentLoader;
pub use types::{Chunk, Document, source_file_name};

/// Chunk every document with the given strategy, preserving document order.
pub fn chunk_documents(
    chunker: &dyn Chunker,
    documents: &[Document],
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunker.chunk_document(doc, config))
        .collect();

    tracing::debug!(
        target: "ingest",
        "created {} chunks from {} documents",
        chunks.len(),
        documents.len()
    );
    chunks
}
