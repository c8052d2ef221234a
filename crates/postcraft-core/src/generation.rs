//! Abstract generation service.
//!
//! The orchestrator only talks to a [`GenerationService`]. Concrete
//! implementations live in `postcraft-interaction` (direct provider access and
//! the proxy client) so tests can substitute a mock.

use crate::data_uri::DataUri;
use crate::error::{PostcraftError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Strict JSON schema the provider must answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

/// A structured text-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationRequest {
    pub system_instruction: String,
    pub user_instruction: String,
    /// Inline visual context sent alongside the instruction.
    #[serde(default)]
    pub images: Vec<DataUri>,
    pub response_schema: ResponseSchema,
}

/// How the image endpoint is driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ImageMode {
    /// Text-to-image.
    Generate,
    /// Compose a new image seeded with one or more existing images.
    Edit { seed_images: Vec<DataUri> },
}

/// Requested output size, rendered as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const SQUARE_1024: ImageSize = ImageSize {
        width: 1024,
        height: 1024,
    };
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::SQUARE_1024
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = PostcraftError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || PostcraftError::config(format!("invalid image size '{value}', expected WIDTHxHEIGHT"));
        let (width, height) = value.split_once('x').ok_or_else(invalid)?;
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for ImageSize {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageQuality {
    Low,
    Medium,
    #[default]
    High,
    Auto,
}

/// An image-synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(flatten)]
    pub mode: ImageMode,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub quality: ImageQuality,
    #[serde(default = "default_count")]
    pub count: u8,
}

fn default_count() -> u8 {
    1
}

impl ImageGenerationRequest {
    /// Picks edit mode when seed images are available, generate mode otherwise.
    pub fn for_prompt(
        prompt: impl Into<String>,
        seed_images: Vec<DataUri>,
        size: ImageSize,
        quality: ImageQuality,
    ) -> Self {
        let mode = if seed_images.is_empty() {
            ImageMode::Generate
        } else {
            ImageMode::Edit { seed_images }
        };
        Self {
            prompt: prompt.into(),
            mode,
            size,
            quality,
            count: 1,
        }
    }

    /// `"generate"` or `"edit"`, for logs.
    pub fn mode_kind(&self) -> &'static str {
        match self.mode {
            ImageMode::Generate => "generate",
            ImageMode::Edit { .. } => "edit",
        }
    }
}

/// Text and image generation backed by an external provider.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Returns the raw JSON document produced by the provider.
    async fn generate_text(&self, request: &TextGenerationRequest) -> Result<String>;

    /// Returns the first synthesized image.
    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<DataUri>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_parse_and_display() {
        let size: ImageSize = "1536x1024".parse().unwrap();
        assert_eq!(size, ImageSize { width: 1536, height: 1024 });
        assert_eq!(ImageSize::default().to_string(), "1024x1024");
        assert!("square".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_for_prompt_selects_mode() {
        let generate =
            ImageGenerationRequest::for_prompt("a cat", vec![], ImageSize::default(), ImageQuality::High);
        assert_eq!(generate.mode, ImageMode::Generate);
        assert_eq!(generate.count, 1);

        let seed = DataUri::from_bytes("image/png", b"seed");
        let edit = ImageGenerationRequest::for_prompt(
            "a cat",
            vec![seed.clone()],
            ImageSize::default(),
            ImageQuality::High,
        );
        assert_eq!(edit.mode, ImageMode::Edit { seed_images: vec![seed] });
    }

    #[test]
    fn test_image_request_wire_shape() {
        let request =
            ImageGenerationRequest::for_prompt("a cat", vec![], ImageSize::default(), ImageQuality::High);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["mode"], "generate");
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["quality"], "high");

        let back: ImageGenerationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
