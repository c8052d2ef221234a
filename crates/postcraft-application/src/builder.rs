//! Post builder use case.
//!
//! `PostBuilder` owns the form state and drives one generation at a time:
//! caption/hashtags first, then image synthesis for the post just recorded.
//! Progress is reported through [`BuilderEvent`]s so a front end can show the
//! caption before the image arrives.

use crate::prompt::{SYSTEM_INSTRUCTION, render_instruction};
use crate::response::{PostDraft, parse_draft, post_schema};
use chrono::Utc;
use futures::future::join_all;
use postcraft_core::config::GenerationSettings;
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::{
    DataUri, FormField, GeneratedPost, GenerationService, GenerationState, History,
    ImageDecoder, ImageGenerationRequest, ImageQuality, ImageSize, ImageSource, Notice, PostId,
    PostRequest, TextGenerationRequest,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Progress notifications emitted by [`PostBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BuilderEvent {
    StateChanged(GenerationState),
    /// Caption and hashtags are ready; the image may still be pending.
    PostGenerated(GeneratedPost),
    ImageAttached { post_id: PostId },
    ReferenceImagesChanged { count: usize },
    Notice(Notice),
}

/// Orchestrates the form and the two-phase generation.
///
/// Mutating operations take `&mut self`, so a single builder never runs two
/// generations at once.
pub struct PostBuilder {
    generation: Arc<dyn GenerationService>,
    decoder: Arc<dyn ImageDecoder>,
    image_size: ImageSize,
    image_quality: ImageQuality,
    request: PostRequest,
    history: History,
    current: Option<PostId>,
    state: GenerationState,
    events: Option<mpsc::UnboundedSender<BuilderEvent>>,
}

impl PostBuilder {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        decoder: Arc<dyn ImageDecoder>,
        settings: &GenerationSettings,
    ) -> Self {
        Self {
            generation,
            decoder,
            image_size: settings.image_size,
            image_quality: settings.image_quality,
            request: PostRequest::new(),
            history: History::new(),
            current: None,
            state: GenerationState::Idle,
            events: None,
        }
    }

    /// Starts a new event stream. A previous subscriber stops receiving events.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<BuilderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn request(&self) -> &PostRequest {
        &self.request
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The post currently on display.
    pub fn current(&self) -> Option<&GeneratedPost> {
        self.current.and_then(|id| self.history.get(id))
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    // ============================================================================
    // Form
    // ============================================================================

    /// Updates one form field.
    pub fn set_field(&mut self, field: FormField) -> Result<()> {
        debug!(?field, "set_field");
        self.request.apply(field).inspect_err(|err| {
            self.notify(Notice::error(err.user_message()));
        })
    }

    /// Decodes and appends reference images; returns how many were appended.
    ///
    /// Only the first `remaining` sources are decoded. Decodes run
    /// concurrently and are appended together once all of them finished.
    /// Sources that fail to decode are skipped with an error notice.
    pub async fn add_reference_images(&mut self, sources: Vec<ImageSource>) -> usize {
        let remaining = self.request.remaining_reference_slots();
        if remaining < sources.len() {
            debug!(
                offered = sources.len(),
                remaining, "dropping reference images over the limit"
            );
        }
        let accepted: Vec<ImageSource> = sources.into_iter().take(remaining).collect();
        if accepted.is_empty() {
            return 0;
        }

        let decoder = Arc::clone(&self.decoder);
        let results = join_all(accepted.iter().map(|source| decoder.decode(source))).await;

        let mut images: Vec<DataUri> = Vec::with_capacity(results.len());
        for (source, result) in accepted.iter().zip(results) {
            match result {
                Ok(image) => images.push(image),
                Err(err) => {
                    warn!(source = %source.name(), error = %err, "failed to read reference image");
                    self.notify(Notice::error(format!(
                        "Could not read {}: {}",
                        source.name(),
                        err.user_message()
                    )));
                }
            }
        }

        let appended = self.request.append_reference_images(images);
        if appended > 0 {
            self.emit(BuilderEvent::ReferenceImagesChanged {
                count: self.request.reference_images().len(),
            });
        }
        appended
    }

    /// Removes one reference image. Out-of-range indices are ignored.
    pub fn remove_reference_image(&mut self, index: usize) -> Option<DataUri> {
        let removed = self.request.remove_reference_image(index);
        if removed.is_some() {
            self.emit(BuilderEvent::ReferenceImagesChanged {
                count: self.request.reference_images().len(),
            });
        }
        removed
    }

    // ============================================================================
    // Generation
    // ============================================================================

    /// Runs both phases and returns the recorded post.
    ///
    /// An image failure is not an error here: the post is returned without a
    /// generated image and the state is `Partial`.
    pub async fn generate(&mut self) -> Result<GeneratedPost> {
        let post_id = self.generate_text().await?;

        match self.synthesize_image(post_id).await {
            Err(err) if err.is_fatal() => return Err(err),
            _ => {}
        }

        self.history
            .get(post_id)
            .cloned()
            .ok_or_else(|| PostcraftError::internal("generated post missing from history"))
    }

    /// Caption/hashtag phase. Records the post and makes it current.
    ///
    /// Validation failures leave the state untouched and never reach the
    /// service.
    pub async fn generate_text(&mut self) -> Result<PostId> {
        if let Err(err) = self.request.ensure_ready() {
            self.notify(Notice::error(err.user_message()));
            return Err(err);
        }

        info!(
            platform = %self.request.platform(),
            format = %self.request.post_format(),
            tone = %self.request.tone(),
            reference_images = self.request.reference_images().len(),
            "generating post"
        );
        self.set_state(GenerationState::GeneratingText);

        let draft = match self.request_draft().await {
            Ok(draft) => draft,
            Err(err) => {
                warn!(error = %err, "post generation failed");
                self.set_state(GenerationState::Failed {
                    reason: err.to_string(),
                });
                self.notify(Notice::error(err.user_message()));
                return Err(err);
            }
        };

        let post = self.record(draft);
        let post_id = post.id;
        info!(%post_id, "post generated");

        self.emit(BuilderEvent::PostGenerated(post));
        self.set_state(GenerationState::GeneratingImage { post_id });
        Ok(post_id)
    }

    /// Image phase for a recorded post.
    ///
    /// Every failure is reported as [`PostcraftError::ImageSynthesis`] and
    /// leaves the post in the history without an image.
    pub async fn synthesize_image(&mut self, post_id: PostId) -> Result<()> {
        let post = self
            .history
            .get(post_id)
            .ok_or_else(|| PostcraftError::validation(format!("unknown post {post_id}")))?;

        let prompt = post.image_description.trim().to_string();
        let seed_images = post.reference_images().to_vec();

        if prompt.is_empty() {
            return self.image_failed(
                post_id,
                PostcraftError::image_synthesis("image description is empty"),
            );
        }

        self.set_state(GenerationState::GeneratingImage { post_id });

        let request =
            ImageGenerationRequest::for_prompt(prompt, seed_images, self.image_size, self.image_quality);
        debug!(%post_id, mode = request.mode_kind(), size = %request.size, "synthesizing image");

        match self.generation.generate_image(&request).await {
            Ok(image) => {
                if !self.history.attach_image(post_id, image) {
                    return Err(PostcraftError::internal(format!(
                        "post {post_id} disappeared during image synthesis"
                    )));
                }
                info!(%post_id, "image attached");
                self.emit(BuilderEvent::ImageAttached { post_id });
                self.set_state(GenerationState::Done { post_id });
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    PostcraftError::ImageSynthesis(_) => err,
                    other => PostcraftError::image_synthesis(other.to_string()),
                };
                self.image_failed(post_id, err)
            }
        }
    }

    async fn request_draft(&self) -> Result<PostDraft> {
        let want_hashtags = self.request.want_hashtags();
        let request = TextGenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_instruction: render_instruction(&self.request)?,
            images: self.request.reference_images().to_vec(),
            response_schema: post_schema(want_hashtags),
        };

        let raw = self.generation.generate_text(&request).await?;
        parse_draft(&raw, want_hashtags)
    }

    fn record(&mut self, draft: PostDraft) -> GeneratedPost {
        let reference_images = self.request.reference_images();
        let post = GeneratedPost {
            id: Uuid::new_v4(),
            caption: draft.caption,
            image_description: draft.image_description,
            hashtags: draft.hashtags,
            platform: self.request.platform(),
            post_format: self.request.post_format(),
            created_at: Utc::now(),
            target_dimensions: self.request.template().dimensions(),
            generated_image: None,
            reference_images: (!reference_images.is_empty()).then(|| reference_images.to_vec()),
        };

        self.history.push_front(post.clone());
        self.current = Some(post.id);
        post
    }

    fn image_failed(&mut self, post_id: PostId, err: PostcraftError) -> Result<()> {
        warn!(%post_id, error = %err, "image synthesis failed; keeping caption");
        self.set_state(GenerationState::Partial {
            post_id,
            reason: err.to_string(),
        });
        self.notify(Notice::error(err.user_message()));
        Err(err)
    }

    fn set_state(&mut self, state: GenerationState) {
        self.state = state.clone();
        self.emit(BuilderEvent::StateChanged(state));
    }

    fn notify(&self, notice: Notice) {
        self.emit(BuilderEvent::Notice(notice));
    }

    fn emit(&self, event: BuilderEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is listening.
            let _ = tx.send(event);
        }
    }
}
