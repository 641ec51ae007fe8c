//! Ingest command - build and persist the vector index.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::Settings;
use crate::pipeline;

pub fn run(settings: &Settings, force: bool, no_progress: bool) -> anyhow::Result<()> {
    let embedder = super::load_embedder(settings)?;

    let bar = ProgressBar::hidden();
    if !no_progress {
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template("{prefix:.cyan} [{bar:30}] {pos}/{len} chunks ({elapsed})")?
                .progress_chars("=> "),
        );
        bar.set_prefix("Embedding");
    }

    let report = pipeline::ingest(settings, embedder, force, |progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.embedded as u64);
    })?;
    bar.finish_and_clear();

    if report.up_to_date {
        println!(
            "{} Index is up to date ({} documents, {} chunks). Use --force to rebuild.",
            style("✓").green(),
            report.documents,
            report.chunks
        );
    } else {
        println!(
            "{} Indexed {} documents into {} chunks with {} ({} dims)",
            style("✓").green(),
            report.documents,
            report.chunks,
            report.manifest.model,
            report.manifest.dimension
        );
    }
    println!("  Index: {}", settings.index_dir().display());
    Ok(())
}
