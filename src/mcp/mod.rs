//! MCP (Model Context Protocol) tool server over stdio.
//!
//! Exposes retrieval and answering as two tools to machine callers. One JSON
//! object per line on the input, one response line per answerable request on
//! the output. Requests are handled strictly in order, one at a time.
//!
//! ## States
//!
//! `Uninitialized` until a pipeline load is attempted, then `Ready` (or
//! `Degraded` when the load failed). While a request is processed the server
//! is `Serving` and returns to `Ready` afterwards. A degraded server stays up
//! and answers every request with the initialization failure.

pub mod protocol;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, error_codes};
pub use tools::{ANSWER_TOOL, SEARCH_TOOL, ToolCall};

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RagResult;
use crate::pipeline::RagPipeline;

/// Message returned for every request while the pipeline is unavailable.
pub const NOT_INITIALIZED: &str = "RAG pipeline is not initialized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    Ready,
    Serving,
    Degraded { reason: String },
}

pub struct McpServer {
    state: ServerState,
    pipeline: Option<RagPipeline>,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            state: ServerState::Uninitialized,
            pipeline: None,
        }
    }

    /// A server that is ready to serve with an already loaded pipeline.
    pub fn with_pipeline(pipeline: RagPipeline) -> Self {
        Self {
            state: ServerState::Ready,
            pipeline: Some(pipeline),
        }
    }

    /// Attempt the pipeline load. Failure degrades the server instead of aborting.
    pub fn initialize<F>(&mut self, load: F)
    where
        F: FnOnce() -> RagResult<RagPipeline>,
    {
        match load() {
            Ok(pipeline) => {
                crate::log_event!(
                    "mcp",
                    "ready",
                    "{} chunks indexed, answer_question {}",
                    pipeline.retriever().indexed_chunks(),
                    if pipeline.composer().is_some() { "enabled" } else { "disabled" }
                );
                self.pipeline = Some(pipeline);
                self.state = ServerState::Ready;
            }
            Err(e) => {
                tracing::error!(target: "mcp", "failed to initialize pipeline: {e}");
                self.pipeline = None;
                self.state = ServerState::Degraded {
                    reason: e.to_string(),
                };
            }
        }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Handle one raw input line. Unparseable lines are logged and yield `None`.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match JsonRpcRequest::parse(line) {
            Ok(request) => Some(self.handle_request(request).await),
            Err(e) => {
                tracing::warn!(target: "mcp", "skipping unparseable request line: {e}");
                None
            }
        }
    }

    /// Handle one request. The response always echoes `request.id`.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        crate::debug_event!("mcp", "request", "{} (id {})", request.method, request.id);
        let id = request.id.clone();

        let pipeline = match (&self.state, self.pipeline.take()) {
            (ServerState::Ready, Some(pipeline)) => pipeline,
            (state, pipeline) => {
                let reason = match state {
                    ServerState::Degraded { reason } => reason.clone(),
                    _ => "pipeline has not been loaded".to_string(),
                };
                self.pipeline = pipeline;
                return JsonRpcResponse::failure(
                    id,
                    JsonRpcError::internal(NOT_INITIALIZED).with_data(reason),
                );
            }
        };

        self.state = ServerState::Serving;
        let outcome = dispatch(&pipeline, &request).await;
        self.pipeline = Some(pipeline);
        self.state = ServerState::Ready;

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                crate::debug_event!("mcp", "error", "{} {}", error.code, error.message);
                JsonRpcResponse::failure(id, error)
            }
        }
    }

    /// Serve requests from `reader` until end of input.
    ///
    /// Each response line is flushed before the next request is read.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let (mut answered, mut failed) = (0usize, 0usize);
        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                answered += 1;
                if response.is_error() {
                    failed += 1;
                }
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        crate::log_event!("mcp", "input closed", "{answered} responses, {failed} errors");
        Ok(())
    }
}

async fn dispatch(pipeline: &RagPipeline, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(json!({
            "protocolVersion": protocol::PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": protocol::SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(tools::tool_manifest(pipeline.top_k())),
        "tools/call" => call_tool(pipeline, tools::parse_tool_call(request.params.as_ref())?).await,
        _ => Err(JsonRpcError::method_not_found()),
    }
}

async fn call_tool(pipeline: &RagPipeline, call: ToolCall) -> Result<Value, JsonRpcError> {
    match call {
        ToolCall::Search { query, top_k } => {
            let k = top_k.unwrap_or(pipeline.top_k());
            let results = pipeline
                .search(&query, k)
                .map_err(|e| JsonRpcError::internal(format!("Search failed: {e}")))?;
            Ok(tools::search_result_content(&results))
        }
        ToolCall::Answer { question } => {
            let (answer, sources) = pipeline
                .answer(&question)
                .await
                .map_err(|e| JsonRpcError::internal(format!("Answer generation failed: {e}")))?;
            Ok(tools::answer_content(&answer, &sources))
        }
    }
}
