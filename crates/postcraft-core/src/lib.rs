//! Domain model and service interfaces for Postcraft.

pub mod config;
pub mod data_uri;
pub mod error;
pub mod generation;
pub mod image_source;
pub mod platform;
pub mod post;
pub mod request;
pub mod secret;
pub mod state;

pub use data_uri::DataUri;
pub use error::{PostcraftError, Result};
pub use generation::{
    GenerationService, ImageGenerationRequest, ImageMode, ImageQuality, ImageSize,
    ResponseSchema, TextGenerationRequest,
};
pub use image_source::{ImageDecoder, ImageSource};
pub use platform::{Dimensions, Platform, PostFormat, Template, Tone};
pub use post::{GeneratedPost, History, PostId};
pub use request::{FormField, HashtagCount, MAX_REFERENCE_IMAGES, PostRequest};
pub use state::{GenerationState, Notice, NoticeLevel};
