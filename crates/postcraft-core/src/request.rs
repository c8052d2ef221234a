//! Form state for a single post generation.

use crate::data_uri::DataUri;
use crate::error::{PostcraftError, Result};
use crate::platform::{Platform, PostFormat, Template, Tone};
use serde::{Deserialize, Serialize};

/// Maximum number of reference images a request may carry.
pub const MAX_REFERENCE_IMAGES: usize = 5;

/// Number of hashtags to request, constrained to 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HashtagCount(u8);

impl HashtagCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PostcraftError::validation(format!(
                "hashtag count must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HashtagCount {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for HashtagCount {
    type Error = PostcraftError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HashtagCount> for u8 {
    fn from(count: HashtagCount) -> Self {
        count.0
    }
}

/// A single user edit to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Description(String),
    Platform(Platform),
    PostFormat(PostFormat),
    Tone(Tone),
    WantHashtags(bool),
    HashtagCount(HashtagCount),
}

/// Everything the user has entered so far.
///
/// `post_format` is always valid for `platform`; fields are private so the
/// only way to change them is through [`PostRequest::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    description: String,
    platform: Platform,
    post_format: PostFormat,
    tone: Tone,
    want_hashtags: bool,
    hashtag_count: HashtagCount,
    reference_images: Vec<DataUri>,
}

impl Default for PostRequest {
    fn default() -> Self {
        let platform = Platform::default();
        Self {
            description: String::new(),
            platform,
            post_format: platform.default_format(),
            tone: Tone::default(),
            want_hashtags: true,
            hashtag_count: HashtagCount::default(),
            reference_images: Vec::new(),
        }
    }
}

impl PostRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one edit.
    ///
    /// Switching platform resets the format to the platform's first one.
    /// Selecting a format the platform does not offer is rejected and leaves
    /// the request untouched.
    pub fn apply(&mut self, field: FormField) -> Result<()> {
        match field {
            FormField::Description(description) => self.description = description,
            FormField::Platform(platform) => {
                self.platform = platform;
                self.post_format = platform.default_format();
            }
            FormField::PostFormat(format) => {
                if !self.platform.supports(format) {
                    return Err(PostcraftError::validation(format!(
                        "{} does not offer the '{format}' format",
                        self.platform.label()
                    )));
                }
                self.post_format = format;
            }
            FormField::Tone(tone) => self.tone = tone,
            FormField::WantHashtags(want) => self.want_hashtags = want,
            FormField::HashtagCount(count) => self.hashtag_count = count,
        }
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn post_format(&self) -> PostFormat {
        self.post_format
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn want_hashtags(&self) -> bool {
        self.want_hashtags
    }

    pub fn hashtag_count(&self) -> HashtagCount {
        self.hashtag_count
    }

    /// Hashtag count to request, or `None` when hashtags are switched off.
    pub fn requested_hashtags(&self) -> Option<HashtagCount> {
        self.want_hashtags.then_some(self.hashtag_count)
    }

    pub fn template(&self) -> Template {
        // The platform/format invariant makes this lookup infallible.
        self.platform
            .template(self.post_format)
            .unwrap_or(self.platform.templates()[0].1)
    }

    pub fn reference_images(&self) -> &[DataUri] {
        &self.reference_images
    }

    pub fn remaining_reference_slots(&self) -> usize {
        MAX_REFERENCE_IMAGES.saturating_sub(self.reference_images.len())
    }

    /// Appends as many images as still fit; returns how many were kept.
    pub fn append_reference_images(&mut self, images: Vec<DataUri>) -> usize {
        let accepted = images.len().min(self.remaining_reference_slots());
        self.reference_images
            .extend(images.into_iter().take(accepted));
        accepted
    }

    /// Removes the image at `index`. Out-of-range indices are ignored.
    pub fn remove_reference_image(&mut self, index: usize) -> Option<DataUri> {
        (index < self.reference_images.len()).then(|| self.reference_images.remove(index))
    }

    /// Validates the generation precondition.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(PostcraftError::validation("description required"));
        }
        Ok(())
    }
}
