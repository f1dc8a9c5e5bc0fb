//! Stats command handler.
//!
//! Reports what the tutor loaded: topics, datasets and models.

use clap::Args;
use stemtutor_core::{config::AppConfig, AppResult};
use stemtutor_knowledge::{TutorBot, TutorStats};

/// Show knowledge base, dataset and model statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let bot = TutorBot::initialize(config).await?;
        let stats = bot.stats();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats);
        }

        Ok(())
    }
}

fn print_stats(stats: &TutorStats) {
    println!("Knowledge base: {} topics", stats.knowledge_base_topics);
    for (subject, count) in &stats.topics_by_subject {
        println!("  {}: {}", subject, count);
    }

    println!("Datasets:");
    let loaded = |count: Option<usize>| match count {
        Some(n) => format!("{} questions", n),
        None => "not loaded".to_string(),
    };
    println!("  ScienceQA: {}", loaded(stats.datasets.scienceqa));
    println!("  SciQ: {}", loaded(stats.datasets.sciq));
    if stats.datasets.mmlu.is_empty() {
        println!("  MMLU: not loaded");
    }
    for (subject, count) in &stats.datasets.mmlu {
        println!("  MMLU {}: {} questions", subject, count);
    }

    println!("Semantic search:");
    match (&stats.embedding_provider, &stats.embedding_model) {
        (Some(provider), Some(model)) if stats.semantic_search => {
            println!("  Provider: {} ({})", provider, model);
            if let Some(dimensions) = stats.embedding_dimensions {
                println!("  Dimensions: {}", dimensions);
            }
            println!(
                "  Indexed: {} topics, {} ScienceQA, {} MMLU, {} SciQ",
                stats.indexed.knowledge_base,
                stats.indexed.scienceqa,
                stats.indexed.mmlu,
                stats.indexed.sciq
            );
            if let Some(cached) = stats.cached_embeddings {
                println!("  Cached embeddings: {}", cached);
            }
        }
        _ => println!("  Unavailable (Newton's law shortcuts only)"),
    }

    println!("Extractive QA: {} ({})", stats.qa_provider, stats.qa_model);
}
