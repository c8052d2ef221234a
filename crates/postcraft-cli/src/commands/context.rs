//! Wiring shared by the commands: config, generation backend, builder.

use anyhow::{Context, Result};
use postcraft_application::PostBuilder;
use postcraft_core::GenerationService;
use postcraft_core::config::AppConfig;
use postcraft_infrastructure::{ConfigStorage, FileImageDecoder, PostcraftPaths, SecretServiceImpl};
use postcraft_interaction::{OpenAiGenerationService, ProxyGenerationService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Global command-line options.
pub struct Options {
    pub config: Option<PathBuf>,
    pub proxy: Option<String>,
}

pub fn load_config(options: &Options) -> Result<AppConfig> {
    let path = match &options.config {
        Some(path) => path.clone(),
        None => PostcraftPaths::config_file()?,
    };
    ConfigStorage::new(path.clone())
        .load()
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Goes through the proxy when one is configured, otherwise straight to
/// the provider with the local credential.
pub async fn generation_service(
    options: &Options,
    config: &AppConfig,
) -> Result<Arc<dyn GenerationService>> {
    let proxy_url = options
        .proxy
        .clone()
        .or_else(|| config.client.proxy_url.clone());

    if let Some(url) = proxy_url {
        tracing::debug!(%url, "using generation proxy");
        let service = ProxyGenerationService::new(
            url,
            Duration::from_secs(config.generation.timeout_secs),
        )?;
        return Ok(Arc::new(service));
    }

    let secrets = SecretServiceImpl::new()?;
    let service = OpenAiGenerationService::try_from_secrets(&secrets, &config.generation)
        .await
        .context("no proxy configured and the OpenAI client could not be set up")?;
    Ok(Arc::new(service))
}

pub async fn builder(options: &Options) -> Result<PostBuilder> {
    let config = load_config(options)?;
    let generation = generation_service(options, &config).await?;
    Ok(PostBuilder::new(
        generation,
        Arc::new(FileImageDecoder::new()),
        &config.generation,
    ))
}
