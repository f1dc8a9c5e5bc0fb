//! Retrieval tests that exercise the full tutor with offline providers.


use crate::curated::KnowledgeBase;
use crate::datasets::DatasetCatalog;
use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::{EmbeddingConfig, EmbeddingEngine, EmbeddingProvider};
use crate::tutor::{TutorBot, TutorSettings};
use std::path::Path;
use std::sync::Arc;
use stemtutor_core::config::DatasetSettings;
use stemtutor_core::{AppError, AppResult};
use stemtutor_qa::{LexicalReader, QaAnswer, QaClient, QaRequest};
use tempfile::TempDir;

pub(crate) const DIMENSIONS: usize = 384;

/// Trigram embeddings that fail for any text mentioning "detonate".
#[derive(Debug)]
pub(crate) struct FlakyProvider(TrigramProvider);

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyProvider {
    fn provider_name(&self) -> &str {
        "flaky"
    }

    fn model_name(&self) -> &str {
        "flaky-v1"
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains("detonate")) {
            return Err(AppError::Embedding("model crashed".to_string()));
        }
        self.0.embed_batch(texts).await
    }
}

/// Reader that always fails.
pub(crate) struct BrokenReader;

#[async_trait::async_trait]
impl QaClient for BrokenReader {
    fn provider_name(&self) -> &str {
        "broken"
    }

    fn model_name(&self) -> &str {
        "broken"
    }

    async fn answer(&self, _request: &QaRequest) -> AppResult<QaAnswer> {
        Err(AppError::Qa("inference server down".to_string()))
    }
}

pub(crate) fn write_datasets(dir: &Path) {
    std::fs::create_dir_all(dir.join("mmlu")).unwrap();
    std::fs::write(
        dir.join("scienceqa.jsonl"),
        r#"{"question": "Which tundra animal has the thickest fur?", "choices": ["arctic fox", "gecko"], "answer": 0, "lecture": "Arctic foxes grow dense winter fur. Geckos live in warm deserts.", "solution": "The arctic fox has the thickest fur."}
"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("sciq.jsonl"),
        r#"{"question": "What gas do volcanoes vent most abundantly?", "correct_answer": "water vapor", "support": "Volcanoes release mostly water vapor. Carbon dioxide comes second.", "distractor1": "helium"}
"#,
    )
    .unwrap();
    // The enzyme question sits in the physics file on purpose
    std::fs::write(
        dir.join("mmlu").join("high_school_physics.jsonl"),
        r#"{"question": "Which unit measures luminous intensity?", "choices": ["candela", "kelvin", "mole", "ampere"], "answer": 0}
{"question": "Which enzyme digests starch in saliva?", "choices": ["amylase", "lipase"], "answer": 0}
"#,
    )
    .unwrap();
}

pub(crate) fn trigram_engine() -> EmbeddingEngine {
    EmbeddingEngine::with_provider(
        Arc::new(TrigramProvider::new(DIMENSIONS)),
        EmbeddingConfig::trigram(DIMENSIONS),
        None,
    )
}

/// Tutor over the builtin knowledge base and whatever datasets `dir` holds.
pub(crate) async fn bot_over_dir(
    dir: &Path,
    engine: Option<EmbeddingEngine>,
    qa: Arc<dyn QaClient>,
    settings: TutorSettings,
) -> TutorBot {
    let datasets = DatasetCatalog::load(dir, &DatasetSettings::default());

    TutorBot::assemble(
        KnowledgeBase::builtin().unwrap(),
        datasets,
        engine,
        qa,
        settings,
    )
    .await
    .unwrap()
}

/// Tutor over the builtin knowledge base and the fixture datasets.
pub(crate) async fn fixture_bot(
    engine: Option<EmbeddingEngine>,
    qa: Arc<dyn QaClient>,
    settings: TutorSettings,
) -> (TempDir, TutorBot) {
    let temp = TempDir::new().unwrap();
    write_datasets(temp.path());
    let bot = bot_over_dir(temp.path(), engine, qa, settings).await;
    (temp, bot)
}

pub(crate) fn flaky_engine() -> EmbeddingEngine {
    EmbeddingEngine::with_provider(
        Arc::new(FlakyProvider(TrigramProvider::new(DIMENSIONS))),
        EmbeddingConfig::trigram(DIMENSIONS),
        None,
    )
}

pub(crate) async fn default_bot() -> (TempDir, TutorBot) {
    fixture_bot(
        Some(trigram_engine()),
        Arc::new(LexicalReader::new()),
        TutorSettings::default(),
    )
    .await
}
