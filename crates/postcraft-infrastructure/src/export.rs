//! Download action: writes a generated image to disk.

use chrono::{DateTime, Utc};
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::{GeneratedPost, Notice};
use std::path::PathBuf;

pub const DOWNLOAD_SUCCESS_MESSAGE: &str = "Post downloaded successfully";

/// Saves the generated image of a post as `post-<timestamp>.<ext>`.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    dir: PathBuf,
}

impl ImageExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn export(&self, post: &GeneratedPost) -> Result<(PathBuf, Notice)> {
        self.export_at(post, Utc::now()).await
    }

    /// Like [`export`](Self::export) with an explicit timestamp for the file name.
    pub async fn export_at(
        &self,
        post: &GeneratedPost,
        now: DateTime<Utc>,
    ) -> Result<(PathBuf, Notice)> {
        let image = post
            .generated_image
            .as_ref()
            .ok_or_else(|| PostcraftError::validation("No image generated"))?;
        let bytes = image.decode()?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name(now, image.extension()));
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(path = %path.display(), post_id = %post.id, "exported generated image");
        Ok((path, Notice::success(DOWNLOAD_SUCCESS_MESSAGE)))
    }
}

/// ISO-8601 timestamp with `:` swapped for `-` so the name is valid everywhere.
fn file_name(now: DateTime<Utc>, extension: &str) -> String {
    format!("post-{}.{extension}", now.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}
