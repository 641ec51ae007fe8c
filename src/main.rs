use clap::Parser;
use ragbase::Settings;
use ragbase::cli::commands::{chat, ingest, init, search, serve, status};
use ragbase::cli::{Cli, Commands};

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    settings.map_err(|e| anyhow::anyhow!("Configuration error: {e}"))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Init writes the config file, so it must not require one
    if let Some(Commands::Init { force }) = &cli.command {
        ragbase::logging::init();
        return init::run_init(*force);
    }

    let settings = load_settings(&cli)?;
    ragbase::logging::init_with_config(&settings.logging);

    match &cli.command {
        Some(Commands::Init { .. }) => Ok(()),
        Some(Commands::Config) => init::run_config(&settings),
        Some(Commands::Ingest { force, no_progress }) => {
            ingest::run(&settings, *force, *no_progress)
        }
        Some(Commands::Search { query, top_k, json }) => {
            search::run(&settings, &query.join(" "), *top_k, *json)
        }
        Some(Commands::Serve) => serve::run(&settings).await,
        Some(Commands::Status) => status::run(&settings),
        None => match cli.one_shot_query() {
            Some(query) => chat::run_once(&settings, &query).await,
            None => chat::run_interactive(&settings).await,
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Credentials may live in a local .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
