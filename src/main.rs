use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logbook::cli::{delete, import, list, search, show, stats};
use logbook::config::Config;
use logbook::store::LogStore;

#[derive(Parser)]
#[command(name = "logbook")]
#[command(about = "Claude Code session log archive with full-text search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "logbook.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Import Claude Code session logs
    Import {
        /// Override the configured logs directory
        #[arg(long)]
        path: Option<String>,
    },

    /// List sessions
    List,

    /// Show a session's messages
    Show {
        /// Session UUID or prefix
        session: String,

        /// Include tool inputs and results
        #[arg(long)]
        tools: bool,
    },

    /// Full-text search over message content
    Search {
        /// Search query (FTS5 syntax; bare words work)
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete a session and everything in it
    Delete {
        /// Session UUID or prefix
        session: String,
    },

    /// Show store statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logbook=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_default();

    // Initialize store
    let store = LogStore::open(&config.database_path())?;

    match cli.command {
        Commands::Import { path } => {
            let logs_path = path
                .map(|p| PathBuf::from(shellexpand::tilde(&p).to_string()))
                .or_else(|| config.logs_path());
            import::run(&store, logs_path)?;
        }
        Commands::List => {
            list::run(&store)?;
        }
        Commands::Show { session, tools } => {
            show::run(&store, &session, tools)?;
        }
        Commands::Search { query, limit } => {
            search::run(&store, &query, limit)?;
        }
        Commands::Delete { session } => {
            delete::run(&store, &session)?;
        }
        Commands::Stats => {
            stats::run(&store)?;
        }
    }

    Ok(())
}
