//! Generation lifecycle and user notifications.

use crate::post::PostId;
use serde::{Deserialize, Serialize};

/// Where the builder is in a generation.
///
/// `Partial` is the caption-ok/image-failed outcome: the post exists in the
/// history but has no generated image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GenerationState {
    #[default]
    Idle,
    GeneratingText,
    GeneratingImage { post_id: PostId },
    Done { post_id: PostId },
    Partial { post_id: PostId, reason: String },
    Failed { reason: String },
}

impl GenerationState {
    /// Post produced by the last generation, if the text step succeeded.
    pub fn post_id(&self) -> Option<PostId> {
        match self {
            GenerationState::GeneratingImage { post_id }
            | GenerationState::Done { post_id }
            | GenerationState::Partial { post_id, .. } => Some(*post_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message shown to the user (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
