//! Chat command handler.
//!
//! Interactive tutoring session on stdin/stdout.

use clap::Args;
use std::io::Write;
use stemtutor_core::{config::AppConfig, AppResult};
use stemtutor_knowledge::TutorBot;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::display;

const SAMPLE_QUESTIONS: [&str; 5] = [
    "What is Newton's second law?",
    "Explain covalent bonding",
    "What is photosynthesis?",
    "How do I solve quadratic equations?",
    "What is kinetic energy?",
];

/// Interactive tutoring session
#[derive(Args, Debug)]
pub struct ChatCommand {}

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Exit,
    History,
    Skip,
    Question(&'a str),
}

fn classify(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    let lowered = line.to_lowercase();

    if matches!(lowered.as_str(), "quit" | "exit" | "bye" | "goodbye") {
        ReplInput::Exit
    } else if lowered == "history" {
        ReplInput::History
    } else if line.is_empty() {
        ReplInput::Skip
    } else {
        ReplInput::Question(line)
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        println!("{}", display::rule('='));
        println!("  🎓 STEM TUTOR - High School Edition");
        println!("{}", display::rule('='));
        println!("\nLoading models and datasets...\n");

        let bot = TutorBot::initialize(config).await?;
        if !bot.has_semantic_search() {
            println!("⚠️ Semantic search unavailable, only Newton's law questions can be answered.\n");
        }

        print_banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("💬 You: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match classify(&line) {
                ReplInput::Exit => {
                    println!("\n👋 Thanks for learning with STEM Tutor!");
                    println!("Keep studying and stay curious! 🚀\n");
                    break;
                }
                ReplInput::History => println!("\n{}\n", bot.history_summary()?),
                ReplInput::Skip => {}
                ReplInput::Question(question) => match bot.chat(question).await {
                    Ok(response) => println!("\n{}\n", display::render_response(&response)),
                    Err(e) => {
                        tracing::warn!("Chat failed: {}", e);
                        println!("\n❌ Error: {}\n", e);
                    }
                },
            }
        }

        Ok(())
    }
}

fn print_banner() {
    println!("{}", display::rule('='));
    println!("✅ Ready! Ask me anything about high school STEM topics");
    println!("{}", display::rule('='));
    println!("\n💡 Sample questions:");
    for question in SAMPLE_QUESTIONS {
        println!("  • {}", question);
    }
    println!("\n📝 Commands:");
    println!("  • Type 'history' to see recent questions");
    println!("  • Type 'quit' or 'exit' to end");
    println!("{}\n", display::rule('='));
}
