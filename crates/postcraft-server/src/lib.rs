//! Generation proxy: holds the provider credential and exposes text and image
//! generation over HTTP.

pub mod api;

pub use api::{ApiError, ApiState, create_router};

use axum::Router;
use postcraft_core::config::ServerSettings;
use postcraft_core::error::{PostcraftError, Result};
use postcraft_core::GenerationService;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct ProxyServer {
    settings: ServerSettings,
    router: Router,
}

impl ProxyServer {
    pub fn new(settings: ServerSettings, generation: Arc<dyn GenerationService>) -> Self {
        let router = create_router(ApiState { generation }, settings.max_body_bytes);
        Self { settings, router }
    }

    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.settings.host, self.settings.port)
            .parse()
            .map_err(|e| PostcraftError::config(format!("invalid server address: {e}")))
    }

    /// Serves until the process is stopped.
    pub async fn start(self) -> Result<()> {
        let addr = self.address()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("postcraft proxy listening on http://{addr}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutting down");
            })
            .await
            .map_err(PostcraftError::from)
    }
}
