//! Reference-image decoding from local files.

use async_trait::async_trait;
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::{DataUri, ImageDecoder, ImageSource};

/// Reads image files and encodes them as data URIs.
///
/// The mime type is guessed from the file name; anything that is not an
/// `image/*` type is rejected, like a file picker filtered to images.
#[derive(Debug, Clone, Default)]
pub struct FileImageDecoder;

impl FileImageDecoder {
    pub fn new() -> Self {
        Self
    }

    fn image_mime(name: &str) -> Result<String> {
        let mime = mime_guess::from_path(name).first().ok_or_else(|| {
            PostcraftError::validation(format!("cannot determine the type of '{name}'"))
        })?;

        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(PostcraftError::validation(format!(
                "'{name}' is not an image ({mime})"
            )));
        }

        Ok(mime.essence_str().to_string())
    }
}

#[async_trait]
impl ImageDecoder for FileImageDecoder {
    async fn decode(&self, source: &ImageSource) -> Result<DataUri> {
        let name = source.name();
        let mime = Self::image_mime(&name)?;

        let uri = match source {
            ImageSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    PostcraftError::io(format!("failed to read {}: {e}", path.display()))
                })?;
                DataUri::from_bytes(mime, &bytes)
            }
            ImageSource::Memory { bytes, .. } => DataUri::from_bytes(mime, bytes),
        };

        tracing::debug!(source = %name, encoded_len = uri.len(), "decoded reference image");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_decodes_png_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("beach.png");
        tokio::fs::write(&path, b"\x89PNG fake").await.unwrap();

        let uri = FileImageDecoder::new()
            .decode(&ImageSource::File(path))
            .await
            .unwrap();

        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.decode().unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_memory_source_uses_name_for_mime() {
        let source = ImageSource::Memory {
            name: "photo.JPG".to_string(),
            bytes: vec![0xff, 0xd8],
        };

        let uri = FileImageDecoder::new().decode(&source).await.unwrap();
        assert_eq!(uri.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let source = ImageSource::Memory {
            name: "notes.txt".to_string(),
            bytes: b"hello".to_vec(),
        };

        let err = FileImageDecoder::new().decode(&source).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = ImageSource::File(temp_dir.path().join("missing.png"));

        let err = FileImageDecoder::new().decode(&source).await.unwrap_err();
        assert!(matches!(err, PostcraftError::Io { .. }));
    }
}
