//! OpenAiGenerationService - direct REST access to OpenAI.
//!
//! Text goes through Chat Completions with a strict `json_schema` response
//! format; images through `images/generations` or `images/edits`.
//! The API key is resolved through [`SecretService`] and must stay server side.

use async_trait::async_trait;
use postcraft_core::config::GenerationSettings;
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::secret::SecretService;
use postcraft_core::{
    DataUri, GenerationService, ImageGenerationRequest, ImageMode, TextGenerationRequest,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mime type of images returned as `b64_json`.
const GENERATED_IMAGE_MIME: &str = "image/png";

/// Generation service that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiGenerationService {
    client: Client,
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
}

impl OpenAiGenerationService {
    pub fn new(api_key: impl Into<String>, settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PostcraftError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            text_model: settings.text_model.clone(),
            image_model: settings.image_model.clone(),
        })
    }

    /// Builds the service from the stored credential.
    ///
    /// A `model_name` in secret.json overrides the configured text model.
    pub async fn try_from_secrets(
        secrets: &dyn SecretService,
        settings: &GenerationSettings,
    ) -> Result<Self> {
        let config = secrets.load_secrets().await?;
        let openai = config.openai.ok_or_else(|| {
            PostcraftError::config(
                "OpenAI API key not found in ~/.config/postcraft/secret.json or OPENAI_API_KEY",
            )
        })?;

        let service = Self::new(openai.api_key, settings)?;
        Ok(match openai.model_name {
            Some(model) => service.with_text_model(model),
            None => service,
        })
    }

    /// Overrides the text model after construction.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn build_chat_request(&self, request: &TextGenerationRequest) -> ChatCompletionRequest {
        let mut parts = vec![MessageContent::Text {
            text: request.user_instruction.clone(),
        }];
        parts.extend(request.images.iter().map(|image| MessageContent::ImageUrl {
            image_url: ImageUrl {
                url: image.to_string(),
            },
        }));

        ChatCompletionRequest {
            model: self.text_model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ChatContent::Text(request.system_instruction.clone()),
                },
                ChatMessage {
                    role: "user",
                    content: ChatContent::Parts(parts),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.response_schema.name.clone(),
                    schema: request.response_schema.schema.clone(),
                    strict: request.response_schema.strict,
                },
            },
        }
    }

    fn build_edit_form(&self, request: &ImageGenerationRequest, seeds: &[DataUri]) -> Result<Form> {
        let mut form = Form::new()
            .text("model", self.image_model.clone())
            .text("prompt", request.prompt.clone())
            .text("size", request.size.to_string())
            .text("quality", request.quality.to_string())
            .text("n", request.count.to_string());

        for (index, seed) in seeds.iter().enumerate() {
            let part = Part::bytes(seed.decode()?)
                .file_name(format!("reference-{index}.{}", seed.extension()))
                .mime_str(seed.mime_type())
                .map_err(|e| PostcraftError::validation(format!("invalid seed image type: {e}")))?;
            form = form.part("image[]", part);
        }

        Ok(form)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|err| PostcraftError::network(None, format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        response.json().await.map_err(|err| {
            PostcraftError::response_validation(format!("Failed to parse OpenAI response: {err}"))
        })
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerationService {
    async fn generate_text(&self, request: &TextGenerationRequest) -> Result<String> {
        let body = self.build_chat_request(request);
        tracing::debug!(
            model = %body.model,
            images = request.images.len(),
            schema = %request.response_schema.name,
            "sending chat completion"
        );

        let parsed: ChatCompletionResponse = self
            .send(self.client.post(self.url("chat/completions")).json(&body))
            .await?;
        extract_text_response(parsed)
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<DataUri> {
        let builder = match &request.mode {
            ImageMode::Generate => {
                let body = ImageGenerationBody {
                    model: &self.image_model,
                    prompt: &request.prompt,
                    size: request.size.to_string(),
                    quality: request.quality.to_string(),
                    n: request.count,
                };
                self.client.post(self.url("images/generations")).json(&body)
            }
            ImageMode::Edit { seed_images } => {
                let form = self.build_edit_form(request, seed_images)?;
                self.client.post(self.url("images/edits")).multipart(form)
            }
        };
        tracing::debug!(model = %self.image_model, size = %request.size, "requesting image");

        let parsed: ImagesResponse = self.send(builder).await?;
        extract_image(parsed)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: ChatContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<MessageContent>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: String,
    quality: String,
    n: u8,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| PostcraftError::response_validation("OpenAI API returned no choices"))?;

    if let Some(refusal) = message.refusal {
        return Err(PostcraftError::response_validation(format!(
            "OpenAI refused the request: {refusal}"
        )));
    }

    message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| PostcraftError::response_validation("No content received from OpenAI"))
}

fn extract_image(response: ImagesResponse) -> Result<DataUri> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|datum| datum.b64_json)
        .map(|payload| DataUri::from_base64(GENERATED_IMAGE_MIME, payload))
        .ok_or_else(|| PostcraftError::response_validation("OpenAI API returned no image data"))
}

fn map_http_error(status: StatusCode, body: &str) -> PostcraftError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());

    PostcraftError::network(Some(status.as_u16()), message)
}
