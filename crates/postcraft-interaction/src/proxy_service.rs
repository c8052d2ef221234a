//! ProxyGenerationService - client for the Postcraft proxy server.
//!
//! Front ends use this so the provider credential never leaves the server.

use crate::proxy_api::{
    ErrorEnvelope, IMAGE_PATH, ImageGenerationResponse, TEXT_PATH, TextGenerationResponse,
};
use async_trait::async_trait;
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::{DataUri, GenerationService, ImageGenerationRequest, TextGenerationRequest};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct ProxyGenerationService {
    client: Client,
    base_url: String,
}

impl ProxyGenerationService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PostcraftError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| PostcraftError::network(None, format!("proxy request to {url} failed: {err}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| PostcraftError::network(Some(status.as_u16()), err.to_string()))?;

        if !status.is_success() {
            // The proxy forwards the typed error; anything else is a transport failure.
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(envelope) => envelope.error,
                Err(_) => PostcraftError::network(
                    Some(status.as_u16()),
                    String::from_utf8_lossy(&bytes).into_owned(),
                ),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            PostcraftError::response_validation(format!("unexpected proxy response: {err}"))
        })
    }
}

#[async_trait]
impl GenerationService for ProxyGenerationService {
    async fn generate_text(&self, request: &TextGenerationRequest) -> Result<String> {
        let response: TextGenerationResponse = self.post(TEXT_PATH, request).await?;
        Ok(response.content)
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<DataUri> {
        let response: ImageGenerationResponse = self.post(IMAGE_PATH, request).await?;
        Ok(response.image)
    }
}
