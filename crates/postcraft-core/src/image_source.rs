//! Raw reference-image input and its decoder interface.

use crate::data_uri::DataUri;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// A user-supplied image before it has been turned into a [`DataUri`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Memory { name: String, bytes: Vec<u8> },
}

impl ImageSource {
    /// File name used to guess the mime type.
    pub fn name(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Memory { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::File(path)
    }
}

/// Turns raw image input into an embeddable blob.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, source: &ImageSource) -> Result<DataUri>;
}
