//! Core types for source documents and their chunks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A source document loaded from the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier (path relative to the documents root, forward slashes).
    id: String,

    /// Full text of the document.
    text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// SHA256 hash of the document text, hex encoded.
    pub fn content_hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.text.as_bytes()))
    }
}

/// A bounded span of one document, the unit of indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier of the parent document.
    pub source: String,

    /// Position of this chunk within its parent (0-based).
    pub ordinal: usize,

    /// Byte range of `content` in the parent text (start, end).
    pub byte_range: (usize, usize),

    /// The text content of this chunk.
    pub content: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(
        source: impl Into<String>,
        ordinal: usize,
        byte_range: (usize, usize),
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            ordinal,
            byte_range,
            content: content.into(),
        }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// File name portion of the source identifier, used for display.
    pub fn source_name(&self) -> &str {
        source_file_name(&self.source)
    }
}

/// Strip directory components from a source identifier.
pub fn source_file_name(source: &str) -> &str {
    source.rsplit(['/', '\\']).next().unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = Document::new("a.md", "same text");
        let b = Document::new("b.md", "same text");
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);
        assert_ne!(a.content_hash(), Document::new("a.md", "other").content_hash());
    }

    #[test]
    fn test_source_name() {
        let chunk = Chunk::new("policies/hr/leave.md", 0, (0, 4), "text");
        assert_eq!(chunk.source_name(), "leave.md");
        assert_eq!(source_file_name(r"C:\kb\remote.md"), "remote.md");
        assert_eq!(source_file_name("plain.md"), "plain.md");
    }
}
