//! HTTP server lifecycle.

use std::sync::Arc;

use axum::Router;
use stemtutor_core::config::ServerSettings;
use stemtutor_core::AppResult;
use stemtutor_knowledge::TutorBot;
use tokio::net::TcpListener;
use tracing::info;

use crate::{routes, state::AppState};

/// Serves the tutor over HTTP until Ctrl-C.
pub struct TutorServer {
    state: AppState,
    address: String,
}

impl TutorServer {
    pub fn new(bot: Arc<TutorBot>, settings: &ServerSettings) -> AppResult<Self> {
        Ok(Self {
            state: AppState::new(bot)?,
            address: settings.bind_address(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// Bind and serve. Returns after a graceful shutdown.
    pub async fn run(self) -> AppResult<()> {
        let listener = TcpListener::bind(self.address.as_str()).await?;
        info!(address = %self.address, "STEM tutor listening on http://{}", self.address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
