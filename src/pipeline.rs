//! The assembled retrieval pipeline and the offline ingestion operation.

use std::sync::Arc;

use crate::answer::AnswerComposer;
use crate::config::Settings;
use crate::documents::{DocumentLoader, RecursiveChunker, chunk_documents};
use crate::embedding::Embedder;
use crate::error::{RagError, RagResult};
use crate::generation::Generator;
use crate::index::{DocumentRecord, IndexManifest, IndexPersistence, IndexProgress, Indexer};
use crate::retrieval::{RetrievedResult, Retriever};

/// Retriever plus optional answer composer, ready to serve queries.
pub struct RagPipeline {
    retriever: Retriever,
    composer: Option<AnswerComposer>,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, composer: Option<AnswerComposer>, top_k: usize) -> Self {
        Self {
            retriever,
            composer,
            top_k,
        }
    }

    /// Load the persisted index and wire it to `embedder` and `generator`.
    ///
    /// Fails with `EmbeddingMismatch` when the index was built in a different
    /// embedding space than `embedder` produces.
    pub fn load(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn Generator>>,
    ) -> RagResult<Self> {
        let persistence = IndexPersistence::new(settings.index_dir());
        let (manifest, index) = persistence.load()?;
        check_embedding_space(&manifest, embedder.as_ref())?;

        crate::log_event!(
            "retrieval",
            "index loaded",
            "{} chunks from {} documents",
            manifest.chunk_count,
            manifest.documents.len()
        );

        let retriever = Retriever::new(embedder, Arc::new(index));
        Ok(Self::new(
            retriever,
            generator.map(AnswerComposer::new),
            settings.retrieval.top_k,
        ))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn composer(&self) -> Option<&AnswerComposer> {
        self.composer.as_ref()
    }

    /// Default number of chunks per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Split into parts, e.g. to hand the retriever and composer to an agent.
    pub fn into_parts(self) -> (Retriever, Option<AnswerComposer>, usize) {
        (self.retriever, self.composer, self.top_k)
    }

    pub fn search(&self, query: &str, k: usize) -> RagResult<Vec<RetrievedResult>> {
        self.retriever.retrieve(query, k)
    }

    /// Retrieve `top_k` chunks and generate a history-free answer.
    ///
    /// Generation failures are returned, not replaced by the fallback text.
    pub async fn answer(&self, question: &str) -> RagResult<(String, Vec<RetrievedResult>)> {
        let composer = self.composer.as_ref().ok_or_else(|| {
            RagError::GeneratorUnavailable("no text-generation credential configured".to_string())
        })?;

        let results = self.retriever.retrieve(question, self.top_k)?;
        let answer = composer.try_compose(question, &results, &[]).await?;
        Ok((answer, results))
    }
}

/// Refuse an index built with another embedding model or dimension.
pub fn check_embedding_space(manifest: &IndexManifest, embedder: &dyn Embedder) -> RagResult<()> {
    if manifest.model != embedder.model_name() || manifest.dimension != embedder.dimension() {
        return Err(RagError::EmbeddingMismatch {
            index_model: manifest.model.clone(),
            index_dimension: manifest.dimension,
            embedder_model: embedder.model_name().to_string(),
            embedder_dimension: embedder.dimension(),
        });
    }
    Ok(())
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    /// True when the persisted index already matched the documents and nothing was rebuilt
    pub up_to_date: bool,
    pub manifest: IndexManifest,
}

/// Load documents, chunk, embed, and persist the index.
///
/// Unless `force` is set, an existing index built from identical documents
/// with the same embedder and chunking is kept as is.
pub fn ingest<F>(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    force: bool,
    on_progress: F,
) -> RagResult<IngestReport>
where
    F: FnMut(IndexProgress),
{
    settings
        .chunking
        .validate()
        .map_err(RagError::ChunkingConfig)?;

    let index_dir = settings.index_dir();
    let loader = DocumentLoader::new(&settings.documents_resolved())?.exclude(&index_dir);
    let documents = loader.load()?;

    let chunks = chunk_documents(&RecursiveChunker::new(), &documents, &settings.chunking);
    let records = DocumentRecord::from_documents(&documents, &chunks);

    let persistence = IndexPersistence::new(&index_dir);
    if !force && persistence.exists() {
        match persistence.manifest() {
            Ok(manifest)
                if manifest.documents == records
                    && manifest.chunking.as_ref() == Some(&settings.chunking)
                    && check_embedding_space(&manifest, embedder.as_ref()).is_ok() =>
            {
                crate::log_event!("ingest", "index up to date", "{}", index_dir.display());
                return Ok(IngestReport {
                    documents: documents.len(),
                    chunks: manifest.chunk_count,
                    up_to_date: true,
                    manifest,
                });
            }
            Ok(_) => crate::debug_event!("ingest", "rebuilding", "documents, chunking or model changed"),
            Err(e) => tracing::warn!(target: "ingest", "rebuilding unreadable index: {e}"),
        }
    }

    let chunk_count = chunks.len();
    let model = embedder.model_name().to_string();
    let index = Indexer::new(embedder).build_with_progress(chunks, on_progress)?;
    let manifest = persistence.save(&index, &model, &settings.chunking, records)?;

    Ok(IngestReport {
        documents: documents.len(),
        chunks: chunk_count,
        up_to_date: false,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    #[test]
    fn test_check_embedding_space() {
        let embedder = HashingEmbedder::new(16);
        let mut manifest = IndexManifest {
            version: 1,
            model: "hashing".to_string(),
            dimension: 16,
            chunk_count: 0,
            created_at: String::new(),
            chunking: None,
            documents: Vec::new(),
        };
        assert!(check_embedding_space(&manifest, &embedder).is_ok());

        manifest.dimension = 384;
        assert!(matches!(
            check_embedding_space(&manifest, &embedder),
            Err(RagError::EmbeddingMismatch { index_dimension: 384, .. })
        ));

        manifest.dimension = 16;
        manifest.model = "AllMiniLML6V2".to_string();
        assert!(check_embedding_space(&manifest, &embedder).is_err());
    }

    #[tokio::test]
    async fn test_answer_without_generator() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
        let pipeline = RagPipeline::new(Retriever::unloaded(embedder), None, 3);

        assert!(matches!(
            pipeline.answer("anything").await,
            Err(RagError::GeneratorUnavailable(_))
        ));
    }
}
