//! Error types for Postcraft.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing message for failures of the caption/hashtag step.
pub const POST_FAILURE_MESSAGE: &str = "Failed to generate post. Please try again.";

/// User-facing message for failures of the image step.
pub const IMAGE_FAILURE_MESSAGE: &str = "Failed to generate image. Please try again.";

/// A shared error type for the whole workspace.
///
/// The first four variants form the generation error surface. The remaining
/// ones cover configuration and local I/O.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PostcraftError {
    /// Bad or missing local input. Blocks the action.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider unreachable or returned a non-2xx status.
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Provider answered with a document that does not match the expected shape.
    #[error("Response validation error: {0}")]
    ResponseValidation(String),

    /// Image synthesis failed after the caption was produced.
    #[error("Image synthesis error: {0}")]
    ImageSynthesis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostcraftError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    pub fn response_validation(message: impl Into<String>) -> Self {
        Self::ResponseValidation(message.into())
    }

    pub fn image_synthesis(message: impl Into<String>) -> Self {
        Self::ImageSynthesis(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_response_validation(&self) -> bool {
        matches!(self, Self::ResponseValidation(_))
    }

    /// Image synthesis failures leave the caption intact; everything else
    /// aborts the operation that raised it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ImageSynthesis(_))
    }

    /// Short text suitable for a transient notification.
    ///
    /// Network and response-shape failures are the same thing from the
    /// user's point of view.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network { .. } | Self::ResponseValidation(_) => POST_FAILURE_MESSAGE.to_string(),
            Self::ImageSynthesis(_) => IMAGE_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PostcraftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PostcraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PostcraftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PostcraftError>`.
pub type Result<T> = std::result::Result<T, PostcraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_response_failures_share_user_message() {
        let network = PostcraftError::network(Some(503), "upstream down");
        let shape = PostcraftError::response_validation("missing caption");

        assert_eq!(network.user_message(), POST_FAILURE_MESSAGE);
        assert_eq!(shape.user_message(), POST_FAILURE_MESSAGE);
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = PostcraftError::validation("description required");
        assert_eq!(err.user_message(), "description required");
        assert!(err.is_validation());
    }

    #[test]
    fn test_only_image_synthesis_is_non_fatal() {
        assert!(!PostcraftError::image_synthesis("timeout").is_fatal());
        assert!(PostcraftError::network(None, "refused").is_fatal());
        assert!(PostcraftError::validation("x").is_fatal());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let err = PostcraftError::validation("description required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["detail"], "description required");
    }
}
