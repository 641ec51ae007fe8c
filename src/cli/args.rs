//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Question answering over a private document collection
#[derive(Parser, Debug)]
#[command(
    name = "ragbase",
    version = env!("CARGO_PKG_VERSION"),
    about = "Question answering over a private document collection",
    long_about = "Ask questions about your knowledge base. Without arguments an interactive \
                  session starts; with words, they are answered once as a single question.",
    after_help = "Examples:\n  ragbase ingest\n  ragbase how many vacation days do I get\n  ragbase -- status of my leave request\n  ragbase search \"remote work\" -k 5\n  ragbase serve\n\n\
                  A question starting with a command name needs `--` in front of it.",
    args_conflicts_with_subcommands = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Question to answer once (omit for an interactive session)
    #[arg(value_name = "QUERY", trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl Cli {
    /// The one-shot question, words joined by spaces.
    pub fn one_shot_query(&self) -> Option<String> {
        let query = self.query.join(" ");
        let query = query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .ragbase directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Build the vector index from the knowledge base
    #[command(about = "Chunk, embed and persist the knowledge base")]
    Ingest {
        /// Rebuild even if the index is up to date
        #[arg(short, long)]
        force: bool,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Retrieve relevant chunks without generating an answer
    #[command(about = "Search the knowledge base")]
    Search {
        /// Search query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results (defaults to retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start MCP server on stdio
    #[command(
        about = "Start MCP server",
        long_about = "Serve the search_knowledge_base and answer_question tools as \
                      line-delimited JSON-RPC on stdin/stdout."
    )]
    Serve,

    /// Report environment, documents and index state
    #[command(about = "Show knowledge base and index status")]
    Status,

    /// Show current configuration settings
    #[command(about = "Display active settings from .ragbase/settings.toml")]
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_interactive() {
        let cli = Cli::try_parse_from(["ragbase"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.one_shot_query(), None);
    }

    #[test]
    fn test_words_join_into_one_query() {
        let cli = Cli::try_parse_from(["ragbase", "how", "many", "vacation", "days?"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(
            cli.one_shot_query().as_deref(),
            Some("how many vacation days?")
        );
    }

    #[test]
    fn test_escaped_question_starting_with_command_name() {
        let cli = Cli::try_parse_from(["ragbase", "--", "status", "of", "my", "leave"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.one_shot_query().as_deref(), Some("status of my leave"));

        // Without the escape the first word selects the command
        assert!(Cli::try_parse_from(["ragbase", "status", "of", "my", "leave"]).is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["ragbase", "search", "remote", "work", "-k", "5", "--json"])
            .unwrap();
        match cli.command {
            Some(Commands::Search { query, top_k, json }) => {
                assert_eq!(query, vec!["remote", "work"]);
                assert_eq!(top_k, Some(5));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["ragbase", "--config", "kb.toml", "ingest", "--force"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("kb.toml")));
        assert!(matches!(cli.command, Some(Commands::Ingest { force: true, .. })));
    }
}
