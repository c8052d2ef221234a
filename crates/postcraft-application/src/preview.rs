//! Preview layout for a generated post.
//!
//! The preview is drawn at the post's fixed target dimensions and scaled down
//! uniformly to fit whatever container the front end provides.

use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::{DataUri, Dimensions, GeneratedPost, Notice, PostId};
use serde::Serialize;

pub const IMAGE_PLACEHOLDER_TEXT: &str = "Image would be generated based on your description";
pub const CAPTION_COPIED_MESSAGE: &str = "Caption copied to clipboard";
pub const HASHTAGS_COPIED_MESSAGE: &str = "Hashtags copied to clipboard";

/// Largest uniform scale at which a `target` box fits inside a `container`.
///
/// Returns 1.0 when the target has no area.
pub fn compute_scale(
    container_width: f64,
    container_height: f64,
    target_width: f64,
    target_height: f64,
) -> f64 {
    if target_width <= 0.0 || target_height <= 0.0 {
        return 1.0;
    }
    (container_width / target_width).min(container_height / target_height)
}

/// `["sun", "beach"]` -> `#sun #beach`.
pub fn hashtag_line(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// On-screen space available to the preview. Both sides are finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerSize {
    width: f64,
    height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |side: f64| side.is_finite() && side > 0.0;
        if !valid(width) || !valid(height) {
            return Err(PostcraftError::validation(format!(
                "container size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum PreviewBlock {
    GeneratedImage(DataUri),
    /// Shown until an image is attached.
    ImagePlaceholder(String),
    ReferenceGrid(Vec<DataUri>),
    Caption(String),
    /// Display form, each tag prefixed with `#`.
    Hashtags(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLayout {
    pub post_id: PostId,
    pub format_label: &'static str,
    pub target: Dimensions,
    pub scale: f64,
    pub blocks: Vec<PreviewBlock>,
}

impl PreviewLayout {
    /// On-screen size of the preview box.
    pub fn scaled_size(&self) -> (f64, f64) {
        (
            f64::from(self.target.width) * self.scale,
            f64::from(self.target.height) * self.scale,
        )
    }
}

/// Keeps track of the container geometry and lays out posts inside it.
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    container: Option<ContainerSize>,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records new container geometry. Returns `false` when nothing changed.
    pub fn resize(&mut self, size: ContainerSize) -> bool {
        if self.container == Some(size) {
            return false;
        }
        tracing::trace!(width = size.width, height = size.height, "preview container resized");
        self.container = Some(size);
        true
    }

    /// Scale for `target`; 1.0 until the container size is known.
    pub fn scale_for(&self, target: Dimensions) -> f64 {
        match self.container {
            Some(container) => compute_scale(
                container.width,
                container.height,
                f64::from(target.width),
                f64::from(target.height),
            ),
            None => 1.0,
        }
    }

    pub fn render(&self, post: &GeneratedPost) -> PreviewLayout {
        let mut blocks = Vec::with_capacity(4);

        blocks.push(match &post.generated_image {
            Some(image) => PreviewBlock::GeneratedImage(image.clone()),
            None if post.image_description.trim().is_empty() => {
                PreviewBlock::ImagePlaceholder(IMAGE_PLACEHOLDER_TEXT.to_string())
            }
            None => PreviewBlock::ImagePlaceholder(post.image_description.clone()),
        });

        if !post.reference_images().is_empty() {
            blocks.push(PreviewBlock::ReferenceGrid(post.reference_images().to_vec()));
        }

        blocks.push(PreviewBlock::Caption(post.caption.clone()));

        if !post.hashtags().is_empty() {
            blocks.push(PreviewBlock::Hashtags(hashtag_line(post.hashtags())));
        }

        PreviewLayout {
            post_id: post.id,
            format_label: post.format_label(),
            target: post.target_dimensions,
            scale: self.scale_for(post.target_dimensions),
            blocks,
        }
    }
}

/// What a copy action puts on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Caption,
    Hashtags,
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Copies part of `post` and returns the confirmation notice.
///
/// Hashtags are copied space-separated and without the `#` prefix.
pub fn copy(post: &GeneratedPost, target: CopyTarget, clipboard: &mut dyn Clipboard) -> Result<Notice> {
    match target {
        CopyTarget::Caption => {
            clipboard.set_text(&post.caption)?;
            Ok(Notice::success(CAPTION_COPIED_MESSAGE))
        }
        CopyTarget::Hashtags => {
            if post.hashtags().is_empty() {
                return Err(PostcraftError::validation("No hashtags to copy"));
            }
            clipboard.set_text(&post.hashtags().join(" "))?;
            Ok(Notice::success(HASHTAGS_COPIED_MESSAGE))
        }
    }
}
