//! Provider adapters implementing [`postcraft_core::GenerationService`].

pub mod openai_api_service;
pub mod proxy_api;
pub mod proxy_service;

pub use openai_api_service::OpenAiGenerationService;
pub use proxy_service::ProxyGenerationService;
