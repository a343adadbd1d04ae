//! Main entry point for the seq2seq translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seq2seq_translator::cli::commands::{self, Commands};

/// Character-level English to Portuguese translator
#[derive(Parser, Debug)]
#[command(name = "seq2seq-translator", version, about, long_about = None)]
struct Args {
    /// Model configuration JSON (vocabularies and dimensions)
    #[arg(long, global = true)]
    model_config: Option<PathBuf>,

    /// Model weights in safetensors format
    #[arg(long, global = true)]
    weights: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},tower_http={}",
                    env!("CARGO_CRATE_NAME"),
                    log_level,
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = commands::resolve_config(args.model_config, args.weights)?;

    // Execute command
    match args.command {
        Some(Commands::Server { host, port }) => {
            commands::handle_server(config.service, host, port).await?;
        }
        Some(Commands::Translate { text, file }) => {
            commands::handle_translate(config.service, text, file).await?;
        }
        Some(Commands::Remote { text, endpoint }) => {
            commands::handle_remote(config.client, text, endpoint).await?;
        }
        Some(Commands::Inspect) => {
            commands::handle_inspect(config.service).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
