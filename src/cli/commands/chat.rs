//! Chat command - one-shot question or interactive session.

use std::future::Future;
use std::io::Write;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::{ChatReply, RagAgent, is_clear_command, is_exit_command};
use crate::config::Settings;
use crate::error::RagError;
use crate::pipeline::RagPipeline;

/// Build the agent. Missing credentials or index are fatal here.
fn build_agent(settings: &Settings) -> anyhow::Result<RagAgent> {
    if settings.llm.api_key().is_none() {
        return Err(RagError::MissingCredential(settings.llm.api_key_env.clone()).into());
    }
    let generator = super::load_generator(settings)?;
    let embedder = super::load_embedder(settings)?;
    let pipeline = RagPipeline::load(settings, embedder, Some(generator))?;
    Ok(RagAgent::from_pipeline(pipeline)?)
}

fn display(reply: &ChatReply) {
    println!("\nAgent: {}\n", reply.display_text());
    let sources = reply.source_names();
    if !sources.is_empty() {
        println!("{}\n", style(format!("Sources: {}", sources.join(", "))).dim());
    }
}

/// Run one turn unless `interrupt` completes first. An interrupted turn is not recorded.
async fn chat_until<I>(agent: &mut RagAgent, query: &str, interrupt: I) -> Option<ChatReply>
where
    I: Future,
{
    tokio::select! {
        reply = agent.chat(query) => Some(reply),
        _ = interrupt => None,
    }
}

/// Answer a single question and exit.
pub async fn run_once(settings: &Settings, query: &str) -> anyhow::Result<()> {
    let mut agent = build_agent(settings)?;
    let reply = agent.chat(query).await;
    display(&reply);
    Ok(())
}

/// Interactive loop until an exit word, end of input, or Ctrl-C.
pub async fn run_interactive(settings: &Settings) -> anyhow::Result<()> {
    eprintln!("Initializing RAG system...");
    let mut agent = build_agent(settings)?;

    println!("{}", style("RAG AI Assistant").bold());
    println!("Ask questions about your knowledge base. Type 'clear' to start over, 'exit' to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(line) = line else {
            println!("\n\nGoodbye!\n");
            break;
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            println!("\nGoodbye!\n");
            break;
        }
        if is_clear_command(query) {
            agent.clear_history();
            println!("{}\n", style("Conversation cleared.").dim());
            continue;
        }

        // Ctrl-C also ends the session while an answer is pending
        let Some(reply) = chat_until(&mut agent, query, tokio::signal::ctrl_c()).await else {
            println!("\n\nGoodbye!\n");
            break;
        };
        display(&reply);
    }

    crate::debug_event!("agent", "session ended", "{} turns", agent.session().len());
    Ok(())
}
