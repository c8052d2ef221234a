//! config.toml storage.

use postcraft_core::config::AppConfig;
use postcraft_core::error::Result;
use std::path::PathBuf;

/// Loads [`AppConfig`].
///
/// A missing or empty file yields the defaults; unknown keys are ignored.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<AppConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "config file missing, using defaults");
                return Ok(AppConfig::default());
            }
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }
}
