//! Response schema for the caption/hashtag step and validation of the
//! provider's answer against it.

use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::ResponseSchema;
use serde::Deserialize;
use serde_json::json;

pub const SCHEMA_NAME: &str = "post";

/// Strict schema sent with the text request.
///
/// `hashtags` is only declared (and required) when hashtags were requested.
pub fn post_schema(want_hashtags: bool) -> ResponseSchema {
    let mut properties = json!({
        "caption": { "type": "string" },
        "imageDescription": { "type": "string" },
    });
    let mut required = vec!["caption", "imageDescription"];

    if want_hashtags {
        properties["hashtags"] = json!({
            "type": "array",
            "description": "Hashtags for the post without the # symbol",
            "items": { "type": "string" },
        });
        required.push("hashtags");
    }

    ResponseSchema {
        name: SCHEMA_NAME.to_string(),
        schema: json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        }),
        strict: true,
    }
}

/// A validated provider answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostDraft {
    pub caption: String,
    pub image_description: String,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
}

/// Parses `raw` and checks it against [`post_schema`].
///
/// Tags are trimmed, a stray leading `#` is dropped, and empty tags are
/// removed; everything else must match the schema exactly.
pub fn parse_draft(raw: &str, want_hashtags: bool) -> Result<PostDraft> {
    let mut draft: PostDraft = serde_json::from_str(raw).map_err(|e| {
        PostcraftError::response_validation(format!("response does not match the post schema: {e}"))
    })?;

    match (&draft.hashtags, want_hashtags) {
        (None, true) => {
            return Err(PostcraftError::response_validation(
                "response is missing the required 'hashtags' field",
            ));
        }
        (Some(_), false) => {
            return Err(PostcraftError::response_validation(
                "response contains 'hashtags' although none were requested",
            ));
        }
        _ => {}
    }

    if let Some(tags) = draft.hashtags.as_mut() {
        *tags = tags
            .iter()
            .map(|tag| tag.trim().trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
    }

    Ok(draft)
}
