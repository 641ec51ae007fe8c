//! Discovery and loading of source documents from the knowledge base directory.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use super::config::DocumentsConfig;
use super::types::Document;
use crate::error::{RagError, RagResult};

/// Loads documents matching the configured glob patterns.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    root: PathBuf,
    patterns: Vec<Pattern>,
    exclude: Vec<PathBuf>,
}

impl DocumentLoader {
    /// Create a loader from configuration. Invalid patterns are reported as errors.
    pub fn new(config: &DocumentsConfig) -> RagResult<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    RagError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("invalid document pattern '{p}': {e}"),
                    ))
                })
            })
            .collect::<RagResult<Vec<_>>>()?;

        Ok(Self {
            root: config.dir.clone(),
            patterns,
            exclude: Vec::new(),
        })
    }

    /// Skip everything under `path` (e.g. the persisted index inside the knowledge base).
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of all matching files, sorted for deterministic ingestion order.
    pub fn discover(&self) -> RagResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(RagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("documents directory not found: {}", self.root.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(target: "ingest", "skipping unreadable entry: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.exclude.iter().any(|ex| path.starts_with(ex)) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };

            if self.patterns.iter().any(|p| p.matches_path(relative)) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read every matching file. Non-UTF-8 files are skipped with a warning.
    pub fn load(&self) -> RagResult<Vec<Document>> {
        let mut documents = Vec::new();

        for path in self.discover()? {
            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push(Document::new(self.document_id(&path), text)),
                Err(e) => {
                    tracing::warn!(target: "ingest", "failed to read {}: {e}", path.display());
                }
            }
        }

        tracing::info!(
            target: "ingest",
            "loaded {} documents from {}",
            documents.len(),
            self.root.display()
        );
        Ok(documents)
    }

    fn document_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_loads_matching_files_recursively() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "leave.md", "Vacation policy");
        write(temp.path(), "hr/remote.md", "Remote work policy");
        write(temp.path(), "notes.txt", "not a markdown file");

        let config = DocumentsConfig {
            dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        let documents = DocumentLoader::new(&config).unwrap().load().unwrap();

        let ids: Vec<&str> = documents.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["hr/remote.md", "leave.md"]);
        assert_eq!(documents[1].text(), "Vacation policy");
    }

    #[test]
    fn test_excludes_index_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "leave.md", "Vacation policy");
        write(temp.path(), "vector_store/readme.md", "generated");

        let config = DocumentsConfig {
            dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        let loader = DocumentLoader::new(&config)
            .unwrap()
            .exclude(temp.path().join("vector_store"));
        assert_eq!(loader.root(), temp.path());

        let documents = loader.load().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id(), "leave.md");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let config = DocumentsConfig {
            dir: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        assert!(DocumentLoader::new(&config).unwrap().discover().is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let config = DocumentsConfig {
            patterns: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(DocumentLoader::new(&config).is_err());
    }
}
