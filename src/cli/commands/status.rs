//! Status command - environment, documents and index state.

use console::style;

use crate::config::Settings;
use crate::documents::DocumentLoader;
use crate::index::IndexPersistence;

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let ok = style("✓").green();
    let missing = style("✗").red();

    println!("{}", style("Environment").bold());
    match &settings.workspace_root {
        Some(root) => println!("  {ok} workspace: {}", root.display()),
        None => println!("  {missing} no .ragbase directory found (run 'ragbase init')"),
    }
    if settings.llm.api_key().is_some() {
        println!("  {ok} {} is set", settings.llm.api_key_env);
    } else {
        println!(
            "  {missing} {} is not set (chat and answer_question unavailable)",
            settings.llm.api_key_env
        );
    }
    println!("  model: {} via {}", settings.llm.model, settings.llm.base_url);

    println!("\n{}", style("Documents").bold());
    let documents = settings.documents_resolved();
    let discovered = DocumentLoader::new(&documents).and_then(|loader| {
        let loader = loader.exclude(settings.index_dir());
        let files = loader.discover()?;
        Ok((loader.root().to_path_buf(), files))
    });
    match discovered {
        Ok((root, files)) => println!(
            "  {ok} {} files matching {:?} in {}",
            files.len(),
            documents.patterns,
            root.display()
        ),
        Err(e) => println!("  {missing} {e}"),
    }

    println!("\n{}", style("Index").bold());
    let persistence = IndexPersistence::new(settings.index_dir());
    match persistence.manifest() {
        Ok(manifest) => {
            println!("  {ok} {}", persistence.base_path().display());
            println!(
                "  {} chunks from {} documents",
                manifest.chunk_count,
                manifest.documents.len()
            );
            println!("  embedding: {} ({} dims)", manifest.model, manifest.dimension);
            println!("  built: {}", manifest.created_at);
        }
        Err(e) if e.is_index_missing() => {
            println!("  {missing} not built yet (run 'ragbase ingest')");
        }
        Err(e) => println!("  {missing} {e}"),
    }
    Ok(())
}
