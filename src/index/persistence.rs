//! On-disk layout of a built index.
//!
//! ```text
//! vector_store/
//!   manifest.json   model, dimension, counts, per-document hashes
//!   chunks.json     chunk payloads with provenance, in index order
//!   vectors.bin     little-endian f32, one row per chunk
//! ```
//!
//! The manifest is written last, so a directory without one is treated as
//! never built.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::flat::FlatIndex;
use super::VectorIndex;
use crate::documents::{Chunk, ChunkingConfig, Document};
use crate::error::{RagError, RagResult};

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";
const VECTORS_FILE: &str = "vectors.bin";

/// Version of the on-disk format
pub const FORMAT_VERSION: u32 = 1;

/// Summary of one indexed source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub content_hash: String,
    pub chunk_count: usize,
}

impl DocumentRecord {
    /// Record every document, counting its chunks in `chunks`.
    pub fn from_documents(documents: &[Document], chunks: &[Chunk]) -> Vec<Self> {
        documents
            .iter()
            .map(|doc| Self {
                id: doc.id().to_string(),
                content_hash: doc.content_hash(),
                chunk_count: chunks.iter().filter(|c| c.source == doc.id()).count(),
            })
            .collect()
    }
}

/// Metadata describing a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Version of the index format
    pub version: u32,

    /// Embedding model the vectors were produced with
    pub model: String,

    pub dimension: usize,

    pub chunk_count: usize,

    /// RFC 3339 creation timestamp
    pub created_at: String,

    /// Chunking the chunks were produced with. Absent in older manifests.
    #[serde(default)]
    pub chunking: Option<ChunkingConfig>,

    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

/// Manages persistence of the index
#[derive(Debug, Clone)]
pub struct IndexPersistence {
    base_path: PathBuf,
}

impl IndexPersistence {
    /// Create a new persistence manager
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write the index, replacing any previous one.
    #[must_use = "Save errors should be handled to ensure data is persisted"]
    pub fn save(
        &self,
        index: &FlatIndex,
        model: &str,
        chunking: &ChunkingConfig,
        documents: Vec<DocumentRecord>,
    ) -> RagResult<IndexManifest> {
        fs::create_dir_all(&self.base_path)?;
        // Stale manifest must not describe the new files while they are written
        self.clear()?;

        let mut bytes = Vec::with_capacity(index.vectors().len() * 4);
        for value in index.vectors() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        fs::write(self.base_path.join(VECTORS_FILE), bytes)?;

        let chunks_json = serde_json::to_string(index.chunks())?;
        fs::write(self.base_path.join(CHUNKS_FILE), chunks_json)?;

        let manifest = IndexManifest {
            version: FORMAT_VERSION,
            model: model.to_string(),
            dimension: index.dimension(),
            chunk_count: index.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
            chunking: Some(chunking.clone()),
            documents,
        };
        fs::write(self.base_path.join(MANIFEST_FILE), serde_json::to_string_pretty(&manifest)?)?;

        tracing::info!(
            target: "ingest",
            "saved {} chunks to {}",
            manifest.chunk_count,
            self.base_path.display()
        );
        Ok(manifest)
    }

    /// Read only the manifest.
    pub fn manifest(&self) -> RagResult<IndexManifest> {
        let path = self.base_path.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).map_err(|e| RagError::IndexNotFound {
            path: self.base_path.clone(),
            reason: e.to_string(),
        })?;

        let manifest: IndexManifest =
            serde_json::from_str(&json).map_err(|e| self.corrupt(format!("{MANIFEST_FILE}: {e}")))?;

        if manifest.version != FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                manifest.version
            )));
        }
        Ok(manifest)
    }

    /// Load the full index: chunk content, provenance, and vectors.
    #[must_use = "Load errors should be handled appropriately"]
    pub fn load(&self) -> RagResult<(IndexManifest, FlatIndex)> {
        let manifest = self.manifest()?;

        let chunks_json = fs::read_to_string(self.base_path.join(CHUNKS_FILE))
            .map_err(|e| self.corrupt(format!("{CHUNKS_FILE}: {e}")))?;
        let chunks: Vec<Chunk> = serde_json::from_str(&chunks_json)
            .map_err(|e| self.corrupt(format!("{CHUNKS_FILE}: {e}")))?;

        if chunks.len() != manifest.chunk_count {
            return Err(self.corrupt(format!(
                "manifest lists {} chunks but {CHUNKS_FILE} holds {}",
                manifest.chunk_count,
                chunks.len()
            )));
        }

        let bytes = fs::read(self.base_path.join(VECTORS_FILE))
            .map_err(|e| self.corrupt(format!("{VECTORS_FILE}: {e}")))?;
        if bytes.len() % 4 != 0 {
            return Err(self.corrupt(format!("{VECTORS_FILE} is truncated")));
        }
        let vectors: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let vector_count = vectors.len();
        let index = FlatIndex::from_parts(manifest.dimension, chunks, vectors).ok_or_else(|| {
            self.corrupt(format!(
                "{VECTORS_FILE} holds {vector_count} values, expected {} x {}",
                manifest.chunk_count, manifest.dimension
            ))
        })?;

        tracing::debug!(
            target: "retrieval",
            "loaded index from {} ({} chunks, model {})",
            self.base_path.display(),
            index.len(),
            manifest.model
        );
        Ok((manifest, index))
    }

    /// Check if an index exists
    pub fn exists(&self) -> bool {
        self.base_path.join(MANIFEST_FILE).is_file()
    }

    /// Delete the persisted index files, manifest first
    pub fn clear(&self) -> Result<(), std::io::Error> {
        for name in [MANIFEST_FILE, CHUNKS_FILE, VECTORS_FILE] {
            let path = self.base_path.join(name);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn corrupt(&self, reason: String) -> RagError {
        RagError::CorruptIndex {
            path: self.base_path.clone(),
            reason,
        }
    }
}
