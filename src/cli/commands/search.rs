//! Search command - retrieval only, no generation.

use console::style;
use serde_json::json;

use crate::config::Settings;
use crate::pipeline::RagPipeline;

pub fn run(settings: &Settings, query: &str, top_k: Option<usize>, json: bool) -> anyhow::Result<()> {
    let k = top_k.unwrap_or(settings.retrieval.top_k);
    if k == 0 {
        anyhow::bail!("--top-k must be at least 1");
    }

    let embedder = super::load_embedder(settings)?;
    let pipeline = RagPipeline::load(settings, embedder, None)?;
    let results = pipeline.search(query, k)?;

    if json {
        let items: Vec<_> = results
            .iter()
            .map(|r| {
                json!({
                    "rank": r.rank,
                    "score": r.score,
                    "source": r.source(),
                    "ordinal": r.chunk.ordinal,
                    "content": r.content(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "query": query, "results": items }))?
        );
        return Ok(());
    }

    if results.is_empty() {
        println!("No results for '{query}'");
        return Ok(());
    }

    for r in &results {
        println!(
            "{} {} {}",
            style(format!("{}.", r.rank)).bold(),
            style(r.source()).cyan(),
            style(format!("(score {:.3})", r.score)).dim()
        );
        for line in r.content().lines() {
            println!("   {line}");
        }
        println!();
    }
    Ok(())
}
