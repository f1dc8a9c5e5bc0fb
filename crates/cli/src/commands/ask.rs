//! Ask command handler.
//!
//! Answers one question and exits.

use clap::Args;
use stemtutor_core::{config::AppConfig, AppError, AppResult};
use stemtutor_knowledge::TutorBot;

use crate::display;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let bot = TutorBot::initialize(config).await?;
        let response = bot.chat(&question).await?;

        if self.json {
            let mut output = serde_json::to_value(&response)?;
            output["confidence_level"] = serde_json::to_value(response.confidence_level())?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", display::render_response(&response));
        }

        Ok(())
    }
}
