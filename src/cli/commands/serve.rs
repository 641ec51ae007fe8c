//! Serve command - MCP server on the stdio transport.

use tokio::io::BufReader;

use crate::config::Settings;
use crate::mcp::McpServer;
use crate::pipeline::RagPipeline;

/// Run the serve command.
///
/// Load failures do not abort: the server starts degraded and reports the
/// failure on every request. A missing API key only disables `answer_question`.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    eprintln!("Starting MCP server on stdio transport");

    let mut server = McpServer::new();
    server.initialize(|| {
        let embedder = crate::embedding::from_settings(&settings.embedding)?;
        let generator = match super::load_generator(settings) {
            Ok(generator) => Some(generator),
            Err(e) => {
                tracing::warn!(target: "mcp", "answer_question disabled: {e}");
                None
            }
        };
        RagPipeline::load(settings, embedder, generator)
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    server.serve(stdin, stdout).await?;
    Ok(())
}
