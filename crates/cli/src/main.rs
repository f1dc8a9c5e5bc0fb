//! STEM Tutor CLI
//!
//! Main entry point for the stemtutor command-line tool.
//! Answers high school STEM questions in the terminal or over HTTP.

mod commands;
mod display;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ServeCommand, StatsCommand};
use std::path::PathBuf;
use stemtutor_core::{config::AppConfig, logging, AppResult};

/// STEM Tutor - answers physics, chemistry, biology and math questions
#[derive(Parser, Debug)]
#[command(name = "stemtutor")]
#[command(about = "High school STEM tutor with semantic search", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "STEMTUTOR_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "STEMTUTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Embedding provider (ollama, trigram)
    #[arg(long, global = true, env = "STEMTUTOR_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    /// Extractive QA provider (huggingface, lexical)
    #[arg(long, global = true, env = "STEMTUTOR_QA_PROVIDER")]
    qa_provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web chat server
    Serve(ServeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive tutoring session
    Chat(ChatCommand),

    /// Show knowledge base, dataset and model statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file, then environment
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.embedding_provider,
        cli.qa_provider,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    config.validate()?;

    tracing::info!("STEM Tutor starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );
    tracing::debug!("QA: {} ({})", config.qa.provider, config.qa.model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
