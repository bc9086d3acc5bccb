use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threatdigest_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "threatdigest")]
#[command(author, version, about = "Daily threat intelligence digest from security feeds and social posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (defaults to ~/.config/threatdigest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily scheduler and the HTTP API
    Serve,
    /// Generate a digest now
    Generate,
    /// Collect and print articles without summarizing
    Fetch {
        /// Print the plain-text block sent to the model instead of markdown
        #[arg(long)]
        raw: bool,
    },
    /// Show the most recent digest
    Latest {
        /// Print the stored JSON document
        #[arg(long)]
        json: bool,
    },
    /// List stored digests
    History,
    /// Show one stored digest
    Show {
        /// Digest file name, e.g. digest_20240514_080000.json
        filename: String,
        /// Print the stored JSON document
        #[arg(long)]
        json: bool,
    },
    /// List configured sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };
    config.validate()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Some(Commands::Serve) | None => commands::serve::run(config).await,
        Some(Commands::Generate) => commands::generate::run(&config).await,
        Some(Commands::Fetch { raw }) => commands::fetch::run(&config, raw).await,
        Some(Commands::Latest { json }) => commands::latest::run(&config, json).await,
        Some(Commands::History) => commands::history::run(&config).await,
        Some(Commands::Show { filename, json }) => commands::show::run(&config, &filename, json).await,
        Some(Commands::Sources) => commands::sources::run(&config),
    }
}
