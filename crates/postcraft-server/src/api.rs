//! HTTP endpoints of the generation proxy.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use postcraft_core::{
    GenerationService, ImageGenerationRequest, PostcraftError, TextGenerationRequest,
};
use postcraft_interaction::proxy_api::{
    ErrorEnvelope, HEALTH_PATH, IMAGE_PATH, ImageGenerationResponse, TEXT_PATH,
    TextGenerationResponse,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// State shared across handlers.
#[derive(Clone)]
pub struct ApiState {
    pub generation: Arc<dyn GenerationService>,
}

/// Builds the proxy routes. Bodies above `max_body_bytes` get a 413.
pub fn create_router(state: ApiState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route(TEXT_PATH, post(generate_text))
        .route(IMAGE_PATH, post(generate_image))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// A [`PostcraftError`] rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: PostcraftError,
}

impl From<PostcraftError> for ApiError {
    fn from(error: PostcraftError) -> Self {
        let status = match &error {
            PostcraftError::Validation(_) => StatusCode::BAD_REQUEST,
            PostcraftError::Network { .. }
            | PostcraftError::ResponseValidation(_)
            | PostcraftError::ImageSynthesis(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                error: PostcraftError::validation(
                    "Request too large. Attach fewer or smaller reference images.",
                ),
            };
        }
        PostcraftError::validation(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        if status.is_server_error() {
            tracing::warn!(%status, error = %self.error, "generation request failed");
        } else {
            tracing::debug!(%status, error = %self.error, "rejected generation request");
        }
        (status, Json(ErrorEnvelope { error: self.error })).into_response()
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "postcraft-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn generate_text(
    State(state): State<ApiState>,
    payload: Result<Json<TextGenerationRequest>, JsonRejection>,
) -> Result<Json<TextGenerationResponse>, ApiError> {
    let Json(request) = payload?;
    if request.user_instruction.trim().is_empty() {
        return Err(PostcraftError::validation("userInstruction must not be empty").into());
    }

    tracing::info!(
        schema = %request.response_schema.name,
        images = request.images.len(),
        "proxying text generation"
    );
    let content = state.generation.generate_text(&request).await?;
    Ok(Json(TextGenerationResponse { content }))
}

async fn generate_image(
    State(state): State<ApiState>,
    payload: Result<Json<ImageGenerationRequest>, JsonRejection>,
) -> Result<Json<ImageGenerationResponse>, ApiError> {
    let Json(request) = payload?;
    if request.prompt.trim().is_empty() {
        return Err(PostcraftError::validation("prompt must not be empty").into());
    }

    tracing::info!(mode = request.mode_kind(), size = %request.size, "proxying image generation");
    let image = state.generation.generate_image(&request).await?;
    Ok(Json(ImageGenerationResponse { image }))
}
