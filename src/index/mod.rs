//! Vector index over embedded chunks.
//!
//! - `VectorIndex`: nearest-neighbour capability used by the retriever
//! - `FlatIndex`: exact cosine search over every stored vector
//! - `Indexer`: embeds chunks and builds a `FlatIndex`
//! - `IndexPersistence`: saves and reloads a built index

pub mod builder;
pub mod flat;
pub mod persistence;

pub use builder::{IndexProgress, Indexer};
pub use flat::FlatIndex;
pub use persistence::{DocumentRecord, IndexManifest, IndexPersistence};

use crate::documents::Chunk;
use crate::error::RagResult;

/// A stored chunk and its similarity to the query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub chunk: Chunk,
    pub score: f32,
}

/// Nearest-neighbour search over (chunk, vector) pairs.
pub trait VectorIndex: Send + Sync {
    /// Length of every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` most similar chunks, best first.
    ///
    /// Ties keep index-internal order. `k` larger than the index returns
    /// everything; `k == 0` returns nothing.
    fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<Neighbor>>;
}
