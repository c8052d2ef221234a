//! postcraft-server binary.

use anyhow::Context;
use clap::Parser;
use postcraft_infrastructure::{ConfigStorage, PostcraftPaths, SecretServiceImpl};
use postcraft_interaction::OpenAiGenerationService;
use postcraft_server::ProxyServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "postcraft-server", version, about = "Postcraft generation proxy")]
struct Args {
    /// Path to config.toml (defaults to ~/.config/postcraft/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to secret.json (defaults to ~/.config/postcraft/secret.json)
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Overrides [server].host
    #[arg(long)]
    host: Option<String>,

    /// Overrides [server].port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => PostcraftPaths::config_file()?,
    };
    let mut config = ConfigStorage::new(config_path.clone())
        .load()
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let secrets = match args.secrets {
        Some(path) => SecretServiceImpl::with_path(path),
        None => SecretServiceImpl::new()?,
    };
    let generation = OpenAiGenerationService::try_from_secrets(&secrets, &config.generation)
        .await
        .context("failed to configure the OpenAI client")?;

    tracing::info!(
        text_model = %config.generation.text_model,
        image_model = %config.generation.image_model,
        "provider configured"
    );

    ProxyServer::new(config.server, Arc::new(generation))
        .start()
        .await?;
    Ok(())
}
