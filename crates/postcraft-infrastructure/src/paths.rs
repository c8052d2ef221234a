//! Unified path management for Postcraft configuration files.
//!
//! ```text
//! ~/.config/postcraft/
//! ├── config.toml    # Models, image parameters, server and client settings
//! └── secret.json    # Provider API key
//! ```

use postcraft_core::error::{PostcraftError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "postcraft";

pub struct PostcraftPaths;

impl PostcraftPaths {
    /// Returns the Postcraft configuration directory (e.g. `~/.config/postcraft/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| PostcraftError::config("cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// The file should be readable by the owner only (600).
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Default target of the download action.
    ///
    /// Falls back to the current directory when the platform has no
    /// download folder.
    pub fn download_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let config_dir = PostcraftPaths::config_dir().unwrap();
        assert!(config_dir.ends_with("postcraft"));
    }

    #[test]
    fn test_files_live_under_config_dir() {
        let config_dir = PostcraftPaths::config_dir().unwrap();

        let config_file = PostcraftPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));

        let secret_file = PostcraftPaths::secret_file().unwrap();
        assert!(secret_file.ends_with("secret.json"));
        assert!(secret_file.starts_with(&config_dir));
    }
}
