//! Configuration types for document discovery and chunking.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where source documents live and which files count as documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Root directory of the knowledge base.
    #[serde(default = "default_documents_dir")]
    pub dir: PathBuf,

    /// Glob patterns for file matching, relative to `dir` (e.g., "**/*.md").
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("knowledge_base")
}

fn default_patterns() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
            patterns: default_patterns(),
        }
    }
}

/// Configuration for document chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters. Larger pieces are split further.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Overlap between adjacent chunks in characters.
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,

    /// Separators tried in priority order. An empty string splits on characters.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

fn default_max_chunk_chars() -> usize {
    500
}

fn default_overlap_chars() -> usize {
    50
}

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            overlap_chars: default_overlap_chars(),
            separators: default_separators(),
        }
    }
}

impl ChunkingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than zero".to_string());
        }

        if self.overlap_chars >= self.max_chunk_chars {
            return Err(format!(
                "overlap_chars ({}) must be less than max_chunk_chars ({})",
                self.overlap_chars, self.max_chunk_chars
            ));
        }

        if self.separators.is_empty() {
            return Err("at least one separator is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_config_defaults() {
        let config = ChunkingConfig::default();
        assert_eq!(config.max_chunk_chars, 500);
        assert_eq!(config.overlap_chars, 50);
        assert_eq!(config.separators, vec!["\n\n", "\n", " ", ""]);
    }

    #[test]
    fn test_chunking_config_validation() {
        let mut config = ChunkingConfig::default();
        assert!(config.validate().is_ok());

        config.overlap_chars = 500;
        assert!(config.validate().is_err());

        config.overlap_chars = 0;
        config.max_chunk_chars = 0;
        assert!(config.validate().is_err());

        config.max_chunk_chars = 100;
        config.separators.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_documents_config_default() {
        let config = DocumentsConfig::default();
        assert_eq!(config.dir, PathBuf::from("knowledge_base"));
        assert_eq!(config.patterns, vec!["**/*.md"]);
    }
}
