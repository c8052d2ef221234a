//! Target platforms, their post formats, and tones.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Pixel size a preview is laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Target dimensions and display label of a post format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

impl Template {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// A named aspect-ratio preset. Which ones are valid depends on the platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PostFormat {
    Post,
    Story,
}

/// Target social network.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    #[default]
    Instagram,
    Facebook,
    Twitter,
}

const INSTAGRAM_FORMATS: &[(PostFormat, Template)] = &[
    (
        PostFormat::Post,
        Template {
            width: 1080,
            height: 1080,
            label: "Post (1:1)",
        },
    ),
    (
        PostFormat::Story,
        Template {
            width: 1080,
            height: 1920,
            label: "Story (9:16)",
        },
    ),
];

const FACEBOOK_FORMATS: &[(PostFormat, Template)] = &[(
    PostFormat::Post,
    Template {
        width: 1200,
        height: 630,
        label: "Post (1.91:1)",
    },
)];

const TWITTER_FORMATS: &[(PostFormat, Template)] = &[(
    PostFormat::Post,
    Template {
        width: 1200,
        height: 675,
        label: "Post (16:9)",
    },
)];

impl Platform {
    /// Formats offered by this platform, in display order.
    pub fn templates(self) -> &'static [(PostFormat, Template)] {
        match self {
            Platform::Instagram => INSTAGRAM_FORMATS,
            Platform::Facebook => FACEBOOK_FORMATS,
            Platform::Twitter => TWITTER_FORMATS,
        }
    }

    pub fn formats(self) -> impl Iterator<Item = PostFormat> {
        self.templates().iter().map(|(format, _)| *format)
    }

    /// The format selected when the user switches to this platform.
    pub fn default_format(self) -> PostFormat {
        self.templates()[0].0
    }

    pub fn supports(self, format: PostFormat) -> bool {
        self.template(format).is_some()
    }

    pub fn template(self, format: PostFormat) -> Option<Template> {
        self.templates()
            .iter()
            .find(|(candidate, _)| *candidate == format)
            .map(|(_, template)| *template)
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
        }
    }

    pub fn all() -> impl Iterator<Item = Platform> {
        Platform::iter()
    }
}

/// Voice of the generated caption.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tone {
    Professional,
    #[default]
    Casual,
    Humorous,
    Inspirational,
    Promotional,
}

impl Tone {
    pub fn label(self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Humorous => "Humorous",
            Tone::Inspirational => "Inspirational",
            Tone::Promotional => "Promotional",
        }
    }

    pub fn all() -> impl Iterator<Item = Tone> {
        Tone::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_every_platform_default_format_is_supported() {
        for platform in Platform::all() {
            let format = platform.default_format();
            assert!(platform.supports(format), "{platform} must support {format}");
        }
    }

    #[test]
    fn test_story_is_instagram_only() {
        assert!(Platform::Instagram.supports(PostFormat::Story));
        assert!(!Platform::Facebook.supports(PostFormat::Story));
        assert!(!Platform::Twitter.supports(PostFormat::Story));
    }

    #[test]
    fn test_template_dimensions() {
        let story = Platform::Instagram.template(PostFormat::Story).unwrap();
        assert_eq!((story.width, story.height), (1080, 1920));
        assert_eq!(story.label, "Story (9:16)");

        let facebook = Platform::Facebook.template(PostFormat::Post).unwrap();
        assert_eq!((facebook.width, facebook.height), (1200, 630));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Platform::from_str("Twitter").unwrap(), Platform::Twitter);
        assert_eq!(Tone::from_str("HUMOROUS").unwrap(), Tone::Humorous);
        assert!(Platform::from_str("myspace").is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&Platform::Facebook).unwrap();
        assert_eq!(json, "\"facebook\"");
        let tone: Tone = serde_json::from_str("\"inspirational\"").unwrap();
        assert_eq!(tone, Tone::Inspirational);
    }
}
