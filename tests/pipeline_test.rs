//! End-to-end ingestion and retrieval over an on-disk knowledge base.

mod common;

use std::sync::Arc;

use common::{embedder, ingested, knowledge_base, offline_settings, write_doc};
use ragbase::index::IndexPersistence;
use ragbase::{Chunker, HashingEmbedder, RagError, RagPipeline, RecursiveChunker, VectorIndex};

#[test]
fn test_ingest_then_search_finds_vacation_policy() {
    let temp = knowledge_base();
    let settings = ingested(temp.path());

    let pipeline = RagPipeline::load(&settings, embedder(&settings), None).unwrap();
    let results = pipeline.search("how many vacation days do employees get", 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].source(), "leave.md");
    assert!(results[0].content().contains("15 vacation days"));
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(
        results.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn test_nested_documents_keep_relative_source() {
    let temp = knowledge_base();
    let settings = ingested(temp.path());

    let pipeline = RagPipeline::load(&settings, embedder(&settings), None).unwrap();
    let results = pipeline.search("remote work equipment", 1).unwrap();
    assert_eq!(results[0].source(), "hr/remote.md");
}

#[test]
fn test_persisted_index_matches_in_memory_build() {
    let temp = knowledge_base();
    let settings = ingested(temp.path());
    let embedder = embedder(&settings);

    // Rebuild the same index in memory
    let documents = ragbase::documents::DocumentLoader::new(&settings.documents_resolved())
        .unwrap()
        .load()
        .unwrap();
    let chunks =
        ragbase::documents::chunk_documents(&RecursiveChunker::new(), &documents, &settings.chunking);
    let in_memory = ragbase::Indexer::new(embedder.clone()).build(chunks).unwrap();

    let (manifest, loaded) = IndexPersistence::new(settings.index_dir()).load().unwrap();
    assert_eq!(manifest.chunk_count, in_memory.len());
    assert_eq!(loaded.chunks(), in_memory.chunks());

    for query in ["sick leave", "coffee", "manager approval"] {
        let vector = embedder.embed(query).unwrap();
        let a = loaded.search(&vector, 5).unwrap();
        let b = in_memory.search(&vector, 5).unwrap();
        assert_eq!(a, b, "results differ for '{query}'");
    }
}

#[test]
fn test_manifest_records_documents() {
    let temp = knowledge_base();
    let settings = ingested(temp.path());

    let manifest = IndexPersistence::new(settings.index_dir()).manifest().unwrap();
    assert_eq!(manifest.model, HashingEmbedder::MODEL_NAME);
    assert_eq!(manifest.dimension, settings.embedding.hashing_dimension);

    let ids: Vec<&str> = manifest.documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["cafeteria.md", "hr/remote.md", "leave.md"]);
    assert!(manifest.documents.iter().all(|d| d.chunk_count >= 1));
}

#[test]
fn test_reingest_skips_unchanged_and_rebuilds_changed() {
    let temp = knowledge_base();
    let settings = offline_settings(temp.path());

    let first = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(!first.up_to_date);

    let second = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(second.up_to_date);
    assert_eq!(second.manifest, first.manifest);

    write_doc(temp.path(), "parking.md", "Parking spots are assigned by seniority.");
    let third = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(!third.up_to_date);
    assert_eq!(third.documents, 4);

    let forced = ragbase::ingest(&settings, embedder(&settings), true, |_| {}).unwrap();
    assert!(!forced.up_to_date);
}

#[test]
fn test_chunking_change_rebuilds_index() {
    let temp = tempfile::TempDir::new().unwrap();
    let text = (0..60)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    write_doc(temp.path(), "words.md", &text);

    let mut settings = offline_settings(temp.path());
    settings.chunking.max_chunk_chars = 100;
    settings.chunking.overlap_chars = 5;
    let first = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(!first.up_to_date);

    // Same chunk count per document is not enough to keep the index
    settings.chunking.overlap_chars = 0;
    let second = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(!second.up_to_date);
    assert_eq!(second.manifest.chunking.as_ref(), Some(&settings.chunking));

    let (_, persisted) = IndexPersistence::new(settings.index_dir()).load().unwrap();
    let fresh: Vec<String> = RecursiveChunker::new()
        .chunk(&text, &settings.chunking)
        .into_iter()
        .map(|c| c.content)
        .collect();
    let stored: Vec<String> = persisted.chunks().iter().map(|c| c.content.clone()).collect();
    assert_eq!(stored, fresh);

    let third = ragbase::ingest(&settings, embedder(&settings), false, |_| {}).unwrap();
    assert!(third.up_to_date);
}

#[test]
fn test_single_document_single_result() {
    let temp = tempfile::TempDir::new().unwrap();
    write_doc(temp.path(), "policy.md", "Employees get 15 vacation days per year.");
    let settings = ingested(temp.path());

    let pipeline = RagPipeline::load(&settings, embedder(&settings), None).unwrap();
    assert_eq!(pipeline.retriever().indexed_chunks(), 1);

    let results = pipeline.search("vacation policy", 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[0].source(), "policy.md");
    assert_eq!(results[0].content(), "Employees get 15 vacation days per year.");
}

#[test]
fn test_load_without_ingest_is_index_not_found() {
    let temp = knowledge_base();
    let settings = offline_settings(temp.path());

    let err = RagPipeline::load(&settings, embedder(&settings), None)
        .err()
        .unwrap();
    assert!(err.is_index_missing(), "unexpected error: {err}");
}

#[test]
fn test_embedding_space_mismatch_is_refused() {
    let temp = knowledge_base();
    let settings = ingested(temp.path());

    let other = Arc::new(HashingEmbedder::new(settings.embedding.hashing_dimension / 2));
    let err = RagPipeline::load(&settings, other, None).err().unwrap();
    assert!(matches!(err, RagError::EmbeddingMismatch { .. }));
}

#[test]
fn test_empty_corpus_is_fatal() {
    let temp = tempfile::TempDir::new().unwrap();
    write_doc(temp.path(), "blank.md", "   \n\n  ");
    let settings = offline_settings(temp.path());

    let err = ragbase::ingest(&settings, embedder(&settings), true, |_| {}).unwrap_err();
    assert!(matches!(err, RagError::EmptyCorpus));
    assert!(!IndexPersistence::new(settings.index_dir()).exists());
}

#[test]
fn test_invalid_chunking_is_rejected_before_indexing() {
    let temp = knowledge_base();
    let mut settings = offline_settings(temp.path());
    settings.chunking.overlap_chars = settings.chunking.max_chunk_chars;

    let err = ragbase::ingest(&settings, embedder(&settings), true, |_| {}).unwrap_err();
    assert!(matches!(err, RagError::ChunkingConfig(_)));
}

#[test]
fn test_long_document_chunks_respect_configuration() {
    let temp = tempfile::TempDir::new().unwrap();
    let paragraph = "Employees may request unpaid leave for family matters. ";
    let long = (0..40)
        .map(|i| format!("{paragraph}Case {i}."))
        .collect::<Vec<_>>()
        .join("\n\n");
    write_doc(temp.path(), "long.md", &long);

    let mut settings = offline_settings(temp.path());
    settings.chunking.max_chunk_chars = 200;
    settings.chunking.overlap_chars = 40;
    let report = ragbase::ingest(&settings, embedder(&settings), true, |_| {}).unwrap();

    let (_, index) = IndexPersistence::new(settings.index_dir()).load().unwrap();
    assert_eq!(index.len(), report.chunks);
    assert!(report.chunks > 5);
    for chunk in index.chunks() {
        assert!(chunk.char_count() <= 200);
        assert_eq!(chunk.content, chunk.content.trim());
        assert_eq!(&long[chunk.byte_range.0..chunk.byte_range.1], chunk.content);
    }

    // Chunker on its own agrees with what was indexed
    let direct = RecursiveChunker::new().chunk(&long, &settings.chunking);
    assert_eq!(direct.len(), report.chunks);
}
