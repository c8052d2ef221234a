//! Generated posts and the in-session history.

use crate::data_uri::DataUri;
use crate::platform::{Dimensions, Platform, PostFormat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a generated post.
pub type PostId = Uuid;

/// One successful generation.
///
/// Everything is fixed at creation except `generated_image`, which arrives
/// later once image synthesis completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub id: PostId,
    pub caption: String,
    pub image_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    pub platform: Platform,
    pub post_format: PostFormat,
    pub created_at: DateTime<Utc>,
    pub target_dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<DataUri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<DataUri>>,
}

impl GeneratedPost {
    /// Display label of the post format, e.g. `Story (9:16)`.
    pub fn format_label(&self) -> &'static str {
        self.platform
            .template(self.post_format)
            .map(|template| template.label)
            .unwrap_or("Custom")
    }

    pub fn reference_images(&self) -> &[DataUri] {
        self.reference_images.as_deref().unwrap_or_default()
    }

    pub fn hashtags(&self) -> &[String] {
        self.hashtags.as_deref().unwrap_or_default()
    }
}

/// Posts generated during this session, newest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    posts: Vec<GeneratedPost>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, post: GeneratedPost) {
        self.posts.insert(0, post);
    }

    /// Attaches an image to the post with the given id.
    ///
    /// Returns `false` when no such post exists.
    pub fn attach_image(&mut self, id: PostId, image: DataUri) -> bool {
        match self.posts.iter_mut().find(|post| post.id == id) {
            Some(post) => {
                post.generated_image = Some(image);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: PostId) -> Option<&GeneratedPost> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn latest(&self) -> Option<&GeneratedPost> {
        self.posts.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedPost> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(caption: &str) -> GeneratedPost {
        GeneratedPost {
            id: Uuid::new_v4(),
            caption: caption.to_string(),
            image_description: "a beach at sunset".to_string(),
            hashtags: Some(vec!["sun".to_string()]),
            platform: Platform::Instagram,
            post_format: PostFormat::Story,
            created_at: Utc::now(),
            target_dimensions: Dimensions {
                width: 1080,
                height: 1920,
            },
            generated_image: None,
            reference_images: None,
        }
    }

    #[test]
    fn test_history_is_newest_first() {
        let mut history = History::new();
        history.push_front(post("first"));
        history.push_front(post("second"));

        let captions: Vec<_> = history.iter().map(|p| p.caption.as_str()).collect();
        assert_eq!(captions, vec!["second", "first"]);
        assert_eq!(history.latest().unwrap().caption, "second");
    }

    #[test]
    fn test_attach_image_by_identity() {
        let mut history = History::new();
        let older = post("older");
        let older_id = older.id;
        history.push_front(older);
        history.push_front(post("newer"));

        let image = DataUri::from_bytes("image/png", b"png");
        assert!(history.attach_image(older_id, image.clone()));
        assert_eq!(history.get(older_id).unwrap().generated_image, Some(image));
        assert!(history.latest().unwrap().generated_image.is_none());

        assert!(!history.attach_image(Uuid::new_v4(), DataUri::from_bytes("image/png", b"")));
    }

    #[test]
    fn test_serialized_shape_uses_camel_case() {
        let json = serde_json::to_value(post("hello")).unwrap();
        assert_eq!(json["imageDescription"], "a beach at sunset");
        assert_eq!(json["postFormat"], "story");
        assert_eq!(json["targetDimensions"]["height"], 1920);
        assert!(json.get("generatedImage").is_none());
        assert!(json.get("referenceImages").is_none());
    }

    #[test]
    fn test_format_label() {
        assert_eq!(post("x").format_label(), "Story (9:16)");
    }
}
