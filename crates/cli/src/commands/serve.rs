//! Serve command handler.
//!
//! Loads the tutor once and serves the web chat page and JSON API.

use clap::Args;
use std::sync::Arc;
use stemtutor_core::{config::AppConfig, AppResult};
use stemtutor_knowledge::TutorBot;
use stemtutor_server::TutorServer;

/// Start the web chat server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut settings = config.server.clone();
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }

        eprintln!("Loading models and datasets. This may take a minute...");
        let bot = Arc::new(TutorBot::initialize(config).await?);

        let server = TutorServer::new(bot, &settings)?;
        eprintln!("STEM Tutor running at http://{}", server.address());
        server.run().await
    }
}
