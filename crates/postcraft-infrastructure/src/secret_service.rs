//! Secret service implementation.
//!
//! Resolves the provider credential from secret.json, falling back to the
//! `OPENAI_API_KEY` / `OPENAI_MODEL_NAME` environment variables.

use crate::paths::PostcraftPaths;
use postcraft_core::config::{OpenAiSecret, SecretConfig};
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::secret::SecretService;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_NAME_ENV: &str = "OPENAI_MODEL_NAME";

/// Cached secret loader over secret.json.
///
/// The file is plaintext JSON and should have 600 permissions.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    /// Uses ~/.config/postcraft/secret.json.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(PostcraftPaths::secret_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads secret.json; a missing file is an empty config.
    async fn read_file(&self) -> Result<SecretConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "secret file missing, checking environment");
                return Ok(SecretConfig::default());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&content).map_err(|err| {
            PostcraftError::config(format!("{} is not valid JSON: {err}", self.path.display()))
        })
    }

    fn cached(&self) -> Option<SecretConfig> {
        self.secrets.read().ok().and_then(|cache| cache.clone())
    }
}

fn secret_from_env() -> Option<OpenAiSecret> {
    let api_key = env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty())?;
    Some(OpenAiSecret {
        api_key,
        model_name: env::var(MODEL_NAME_ENV).ok(),
    })
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        if let Some(config) = self.cached() {
            return Ok(config);
        }

        let mut loaded = self.read_file().await?;
        if loaded.openai.is_none() {
            loaded.openai = secret_from_env();
        }

        if let Ok(mut cache) = self.secrets.write() {
            *cache = Some(loaded.clone());
        }
        Ok(loaded)
    }
}
