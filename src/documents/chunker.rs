//! Document chunking strategies.
//!
//! Provides the `Chunker` trait and a recursive separator-based splitter that
//! produces overlapping chunks sized for embedding.

use std::collections::VecDeque;

use super::config::ChunkingConfig;
use super::types::{Chunk, Document};

/// A raw chunk before being attached to its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Byte range in the source document (start, end).
    pub byte_range: (usize, usize),

    /// The text content of this chunk.
    pub content: String,
}

impl RawChunk {
    /// Create a new raw chunk.
    pub fn new(byte_range: (usize, usize), content: String) -> Self {
        Self {
            byte_range,
            content,
        }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Trait for document chunking strategies.
pub trait Chunker: Send + Sync {
    /// Split document content into chunks.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk>;

    /// Chunk a whole document, attaching provenance and ordinals.
    fn chunk_document(&self, document: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
        self.chunk(document.text(), config)
            .into_iter()
            .enumerate()
            .map(|(ordinal, raw)| Chunk::new(document.id(), ordinal, raw.byte_range, raw.content))
            .collect()
    }
}

/// Recursive character splitter.
///
/// Algorithm:
/// 1. Pick the first separator (in priority order) present in the text
/// 2. Split at every occurrence, keeping the separator at the start of the next piece
/// 3. Greedily merge pieces shorter than `max_chunk_chars`, keeping up to
///    `overlap_chars` of trailing pieces when a chunk is emitted
/// 4. Recurse with the remaining separators on pieces that are still too long
/// 5. Trim whitespace from every chunk and drop empty ones
///
/// Greedy, so there is no guarantee that sentences stay intact.
#[derive(Debug, Default)]
pub struct RecursiveChunker;

impl RecursiveChunker {
    /// Create a new recursive chunker.
    pub fn new() -> Self {
        Self
    }
}

type Span = (usize, usize);

impl Chunker for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let splitter = Splitter {
            text: content,
            max_chars: config.max_chunk_chars,
            overlap_chars: config.overlap_chars,
        };

        // Short documents are kept whole
        let whole = splitter.trim((0, content.len()));
        if splitter.char_len(whole) <= config.max_chunk_chars {
            return vec![RawChunk::new(whole, content[whole.0..whole.1].to_string())];
        }

        let separators: Vec<&str> = config.separators.iter().map(String::as_str).collect();

        splitter
            .split((0, content.len()), &separators)
            .into_iter()
            .map(|span| splitter.trim(span))
            .filter(|(start, end)| start < end)
            .map(|span| RawChunk::new(span, content[span.0..span.1].to_string()))
            .collect()
    }
}

/// Splitting state over one text. All spans are byte ranges into `text`.
struct Splitter<'a> {
    text: &'a str,
    max_chars: usize,
    overlap_chars: usize,
}

impl Splitter<'_> {
    fn char_len(&self, span: Span) -> usize {
        self.text[span.0..span.1].chars().count()
    }

    fn trim(&self, span: Span) -> Span {
        let slice = &self.text[span.0..span.1];
        let start = span.0 + (slice.len() - slice.trim_start().len());
        let end = span.1 - (slice.len() - slice.trim_end().len());
        if start >= end { (start, start) } else { (start, end) }
    }

    fn split(&self, span: Span, separators: &[&str]) -> Vec<Span> {
        let slice = &self.text[span.0..span.1];

        let mut separator = separators.last().copied().unwrap_or("");
        let mut remaining: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if slice.contains(candidate) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting = Vec::new();

        for piece in self.pieces(span, separator) {
            if self.char_len(piece) < self.max_chars {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    /// Split a span at each separator occurrence; the separator opens the next piece.
    fn pieces(&self, span: Span, separator: &str) -> Vec<Span> {
        let slice = &self.text[span.0..span.1];

        if separator.is_empty() {
            return slice
                .char_indices()
                .map(|(i, c)| (span.0 + i, span.0 + i + c.len_utf8()))
                .collect();
        }

        let mut pieces = Vec::new();
        let mut start = span.0;
        for (offset, _) in slice.match_indices(separator) {
            let at = span.0 + offset;
            if at > start {
                pieces.push((start, at));
            }
            start = at;
        }
        if span.1 > start {
            pieces.push((start, span.1));
        }
        pieces
    }

    /// Merge adjacent pieces into chunks of at most `max_chars`, with overlap.
    fn merge(&self, pieces: &[Span]) -> Vec<Span> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(Span, usize)> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = self.char_len(piece);

            if total + len > self.max_chars {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    chunks.push((first.0.0, last.0.1));
                }

                // Keep only the tail that fits the overlap budget
                while total > self.overlap_chars || (total + len > self.max_chars && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            chunks.push((first.0.0, last.0.1));
        }

        chunks
    }
}
