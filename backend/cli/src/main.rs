use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use canta_config::{load_or_env, CantaConfig};
use canta_core::mime::mime_for_path;
use canta_core::ImagePayload;
use canta_extraction::MenuExtractor;
use canta_gateway::{start_server, GatewayState};
use canta_logging::{init_logger, key_preview};
use canta_vision::OpenAiVision;

#[derive(Parser)]
#[command(name = "canta")]
#[command(about = "Canta — menu/catalog digitization backend")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file (falls back to env vars if absent)
    #[arg(short, long, default_value = "canta.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one extraction against a local image and print the document
    Extract {
        /// Path to a menu/catalog image
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_or_env(&cli.config)?;
    init_logger(&config.log.dir, &config.log.level);

    match cli.command {
        Commands::Serve { port } => run_server(config, port).await,
        Commands::Extract { image } => run_extract(config, image).await,
    }
}

fn build_extractor(config: &CantaConfig) -> Result<Arc<MenuExtractor>> {
    let api_key = config
        .vision
        .api_key
        .clone()
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;
    info!(key = %key_preview(&api_key), model = %config.vision.model, "vision client ready");

    let model = OpenAiVision::new(api_key)
        .with_model(&config.vision.model)
        .with_base_url(&config.vision.base_url)
        .with_timeout(Duration::from_secs(config.vision.timeout_secs));

    Ok(Arc::new(
        MenuExtractor::new(Arc::new(model))
            .with_max_output_tokens(config.vision.max_output_tokens),
    ))
}

async fn run_server(config: CantaConfig, port: Option<u16>) -> Result<()> {
    let extractor = build_extractor(&config)?;
    let addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind,
        port.unwrap_or(config.server.port)
    )
    .parse()
    .context("invalid bind address")?;

    start_server(
        addr,
        GatewayState {
            extractor,
            cors_origins: config.cors_origins,
        },
    )
    .await
}

async fn run_extract(config: CantaConfig, image: PathBuf) -> Result<()> {
    let extractor = build_extractor(&config)?;
    let bytes = std::fs::read(&image)
        .with_context(|| format!("failed to read image {}", image.display()))?;
    let mime = mime_for_path(&image);

    match extractor.extract(&ImagePayload::new(bytes, mime)).await {
        Ok(doc) => {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Err(failure) => {
            eprintln!("Error: {failure}");
            std::process::exit(1);
        }
    }
}
