//! Wire types shared by the proxy server and [`ProxyGenerationService`].
//!
//! [`ProxyGenerationService`]: crate::ProxyGenerationService

use postcraft_core::{DataUri, PostcraftError};
use serde::{Deserialize, Serialize};

pub const HEALTH_PATH: &str = "/health";
pub const TEXT_PATH: &str = "/api/generate/text";
pub const IMAGE_PATH: &str = "/api/generate/image";

/// Body of a successful `POST /api/generate/text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGenerationResponse {
    /// Raw JSON document produced by the provider, unvalidated.
    pub content: String,
}

/// Body of a successful `POST /api/generate/image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationResponse {
    pub image: DataUri,
}

/// Body of every failed proxy call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: PostcraftError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let envelope = ErrorEnvelope {
            error: PostcraftError::network(Some(429), "rate limited"),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error"]["kind"], "network");
        assert_eq!(json["error"]["detail"]["status"], 429);

        let back: ErrorEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, envelope);
    }
}
