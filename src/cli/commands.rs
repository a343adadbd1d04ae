//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::config::{AppConfig, ClientConfig, ServiceConfig};
use crate::core::models::TranslationResponse;

const NO_TRANSLATION: &str = "(sem tradução)";

/// Commands for the seq2seq translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default: 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Translate text locally without starting the server
    Translate {
        /// Sentence to translate
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File with one sentence per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Translate through a running server
    Remote {
        /// Sentence to translate
        #[arg(short, long)]
        text: String,

        /// Server URL (default: http://localhost:5000)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print model dimensions and checkpoint tensors
    Inspect,
}

/// Handle server command
pub async fn handle_server(
    mut config: ServiceConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;
    use tracing::info;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;

    info!("Starting HTTP server on {}", config.bind_address());
    println!("🚀 Server starting on http://{}", config.bind_address());

    run_server(&config).await?;

    Ok(())
}

/// Handle local translation command
pub async fn handle_translate(
    config: ServiceConfig,
    text: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::core::engine::Seq2SeqTranslator;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::info;

    let translator = tokio::task::spawn_blocking(move || {
        Seq2SeqTranslator::load(&config.model_config_path, &config.model_weights_path)
    })
    .await??;

    if let Some(text) = text {
        println!("{}", translator.translate(&text)?);
        return Ok(());
    }

    let Some(file) = file else {
        anyhow::bail!("Either --text or --file is required");
    };

    let start_time = Instant::now();
    let content = std::fs::read_to_string(&file)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

    info!("Translating {} lines from {}", lines.len(), file.display());

    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut failed = 0;
    for line in &lines {
        match translator.translate(line) {
            Ok(translated) => pb.println(format!("{}\t{}", line, translated)),
            Err(e) => {
                failed += 1;
                pb.println(format!("{}\t[error: {}]", line, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    let duration = start_time.elapsed();
    info!(
        "Completed: {} translated, {} failed in {:?}",
        lines.len() - failed,
        failed,
        duration
    );

    println!("\n✅ Translation completed!");
    println!("   Translated: {}", lines.len() - failed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle remote translation command
pub async fn handle_remote(
    mut config: ClientConfig,
    text: String,
    endpoint: Option<String>,
) -> anyhow::Result<()> {
    use crate::core::client::TranslationClient;

    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }

    let client = TranslationClient::new(config)?;
    let response = client.translate(&text).await?;
    println!("{}", remote_output(response.as_ref()));

    Ok(())
}

/// Text shown for a remote result; blank or absent translations get a placeholder
fn remote_output(response: Option<&TranslationResponse>) -> &str {
    match response {
        Some(response) if !response.translated.is_empty() => &response.translated,
        _ => NO_TRANSLATION,
    }
}

/// Handle inspect command
pub async fn handle_inspect(config: ServiceConfig) -> anyhow::Result<()> {
    use crate::core::engine::Seq2SeqTranslator;
    use crate::nn::weights::WeightStore;

    let weights = WeightStore::from_file(&config.model_weights_path)?;
    let model_config = crate::core::vocab::ModelConfig::from_file(&config.model_config_path)?;
    let translator = Seq2SeqTranslator::new(model_config, &weights)?;

    println!("{}", serde_json::to_string_pretty(&translator.info())?);
    println!("\nTensors:");
    for name in weights.tensor_names() {
        println!("   {}", name);
    }

    Ok(())
}

/// Resolve configuration, applying global model path overrides
pub fn resolve_config(
    model_config: Option<PathBuf>,
    weights: Option<PathBuf>,
) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load()?;

    if let Some(path) = model_config {
        config.service.model_config_path = path;
    }
    if let Some(path) = weights {
        config.service.model_weights_path = path;
    }

    config.validate()?;
    Ok(config)
}
