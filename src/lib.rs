pub mod agent;
pub mod answer;
pub mod cli;
pub mod config;
pub mod documents;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod logging;
pub mod mcp;
pub mod pipeline;
pub mod retrieval;
pub mod session;

pub use agent::{ChatReply, RagAgent};
pub use answer::AnswerComposer;
pub use config::Settings;
pub use documents::{Chunk, Chunker, ChunkingConfig, Document, RecursiveChunker};
pub use embedding::{Embedder, FastEmbedder, HashingEmbedder};
pub use error::{RagError, RagResult};
pub use generation::{ChatMessage, Generator, OpenAiCompatibleGenerator};
pub use index::{FlatIndex, IndexPersistence, Indexer, VectorIndex};
pub use mcp::McpServer;
pub use pipeline::{RagPipeline, ingest};
pub use retrieval::{RetrievedResult, Retriever};
pub use session::{ConversationSession, ConversationTurn};
