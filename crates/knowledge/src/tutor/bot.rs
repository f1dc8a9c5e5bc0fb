//! The tutor bot: retrieval strategies and answer assembly.

use crate::curated::{KnowledgeBase, Topic};
use crate::datasets::{DatasetCatalog, DatasetCounts, MmluRow, SciqRow, ScienceQaRow};
use crate::embeddings::{EmbeddingConfig, EmbeddingEngine};
use crate::index::{ScoredMatch, SemanticIndex};
use crate::subjects::{detect_law_number, detect_subject, Subject};
use crate::tutor::format::{
    format_answer_with_steps, format_mmlu, format_scienceqa, no_match_message, related_answer,
    INCOMPLETE_QUESTION,
};
use crate::tutor::history::ConversationHistory;
use crate::tutor::types::{AnswerSpan, Source, TutorResponse};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use stemtutor_core::config::RetrievalSettings;
use stemtutor_core::{AppConfig, AppError, AppResult};
use stemtutor_qa::{QaClient, QaRequest};
use tracing::{debug, info, instrument, warn};

const NEWTON_LAW_TOPICS: [&str; 3] = [
    "newtons_first_law",
    "newtons_second_law",
    "newtons_third_law",
];

/// Confidence reported for a direct Newton's law match.
const NEWTON_LAW_CONFIDENCE: f32 = 0.95;

/// Tunables the bot needs from the application config.
#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub retrieval: RetrievalSettings,
    /// Minimum extractive span score for a highlight to be attached.
    pub qa_min_score: f32,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            retrieval: RetrievalSettings::default(),
            qa_min_score: 0.1,
        }
    }
}

impl From<&AppConfig> for TutorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            retrieval: config.retrieval.clone(),
            qa_min_score: config.qa.min_score,
        }
    }
}

/// Number of encoded entries per searchable source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSizes {
    pub knowledge_base: usize,
    pub scienceqa: usize,
    pub mmlu: usize,
    pub sciq: usize,
}

/// Snapshot of what the bot has loaded.
#[derive(Debug, Clone, Serialize)]
pub struct TutorStats {
    pub knowledge_base_topics: usize,
    pub topics_by_subject: Vec<(Subject, usize)>,
    pub datasets: DatasetCounts,
    pub indexed: IndexSizes,
    pub semantic_search: bool,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dimensions: Option<usize>,
    pub cached_embeddings: Option<usize>,
    pub qa_provider: String,
    pub qa_model: String,
}

/// A winning match before the extractive step.
struct Candidate {
    response: TutorResponse,
    passage: Option<String>,
}

/// STEM tutor chatbot.
///
/// Built once per process; `chat` takes `&self` so a single instance can be
/// shared across request handlers.
pub struct TutorBot {
    settings: TutorSettings,
    knowledge_base: KnowledgeBase,
    engine: Option<EmbeddingEngine>,
    qa: Arc<dyn QaClient>,
    kb_index: SemanticIndex<usize>,
    scienceqa: SemanticIndex<ScienceQaRow>,
    mmlu: SemanticIndex<MmluRow>,
    sciq: SemanticIndex<SciqRow>,
    dataset_counts: DatasetCounts,
    history: Mutex<ConversationHistory>,
}

impl std::fmt::Debug for TutorBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorBot")
            .field("engine", &self.engine)
            .field("qa", &self.qa.provider_name())
            .field("topics", &self.knowledge_base.len())
            .finish()
    }
}

impl TutorBot {
    /// Load models and datasets described by the config.
    ///
    /// An unavailable embedding model is not fatal: the bot starts without
    /// semantic search and answers only Newton's law shortcuts.
    pub async fn initialize(config: &AppConfig) -> AppResult<Self> {
        info!("Initializing STEM tutor");

        let knowledge_base = KnowledgeBase::builtin()?;

        let cache_path = match config.ensure_state_dir() {
            Ok(()) => Some(config.embedding_cache_path()),
            Err(e) => {
                warn!("State directory unavailable, embeddings will not be cached: {}", e);
                None
            }
        };

        let engine = match EmbeddingEngine::new(
            EmbeddingConfig::from(&config.embedding),
            cache_path.as_deref(),
        )
        .await
        {
            Ok(engine) => {
                info!("Semantic model loaded");
                Some(engine)
            }
            Err(e) => {
                warn!("Semantic model failed: {}", e);
                None
            }
        };

        info!(
            "Loading QA model: provider={}, model={}",
            config.qa.provider, config.qa.model
        );
        let api_key = config.resolve_qa_api_key();
        let qa = stemtutor_qa::create_client(
            &config.qa.provider,
            Some(config.qa.endpoint.as_str()),
            &config.qa.model,
            api_key.as_deref(),
            Duration::from_secs(config.qa.timeout_secs),
        )
        .map_err(AppError::Qa)?;

        let datasets = DatasetCatalog::load(&config.datasets_dir(), &config.datasets);

        Self::assemble(
            knowledge_base,
            datasets,
            engine,
            qa,
            TutorSettings::from(config),
        )
        .await
    }

    /// Build a bot from already-loaded parts, encoding every searchable text.
    pub async fn assemble(
        knowledge_base: KnowledgeBase,
        datasets: DatasetCatalog,
        engine: Option<EmbeddingEngine>,
        qa: Arc<dyn QaClient>,
        settings: TutorSettings,
    ) -> AppResult<Self> {
        let dataset_counts = datasets.counts();
        let DatasetCatalog {
            scienceqa,
            sciq,
            mmlu,
        } = datasets;
        let mmlu_rows: Option<Vec<MmluRow>> = if mmlu.is_empty() {
            None
        } else {
            Some(mmlu.into_iter().flat_map(|(_, rows)| rows).collect())
        };

        let (kb_index, scienceqa, mmlu, sciq) = match &engine {
            Some(engine) => {
                info!("Pre-encoding knowledge base for semantic search");
                let topics = knowledge_base.topics();
                let kb_index = engine
                    .build_index((0..topics.len()).collect::<Vec<usize>>(), |&i| {
                        topics[i].embedding_text()
                    })
                    .await?;

                (
                    kb_index,
                    encode_dataset(engine, "ScienceQA", scienceqa, |r: &ScienceQaRow| {
                        r.question.clone()
                    })
                    .await,
                    encode_dataset(engine, "MMLU", mmlu_rows, |r: &MmluRow| r.question.clone()).await,
                    encode_dataset(engine, "SciQ", sciq, |r: &SciqRow| r.question.clone()).await,
                )
            }
            None => (
                SemanticIndex::new(),
                SemanticIndex::new(),
                SemanticIndex::new(),
                SemanticIndex::new(),
            ),
        };

        info!("Tutor ready");

        Ok(Self {
            history: Mutex::new(ConversationHistory::new(settings.retrieval.max_history)),
            settings,
            knowledge_base,
            engine,
            qa,
            kb_index,
            scienceqa,
            mmlu,
            sciq,
            dataset_counts,
        })
    }

    fn lock_history(&self) -> AppResult<MutexGuard<'_, ConversationHistory>> {
        self.history
            .lock()
            .map_err(|_| AppError::Other("Conversation history lock poisoned".to_string()))
    }

    /// Answer a question, trying each source in turn.
    #[instrument(skip(self))]
    pub async fn chat(&self, question: &str) -> AppResult<TutorResponse> {
        let question = question.trim();
        if question.chars().count() < 3 {
            return Ok(TutorResponse::message(INCOMPLETE_QUESTION));
        }

        let subject = detect_subject(question);
        {
            let mut history = self.lock_history()?;
            history.record(question);
            if let Some(subject) = subject {
                debug!("Detected subject: {}", subject);
                history.set_subject(subject);
            }
        }

        if let Some(candidate) = self.newton_law_shortcut(question) {
            info!("Detected Newton's law question, direct match");
            return Ok(self.finish(question, candidate).await);
        }

        let Some(engine) = &self.engine else {
            debug!("Semantic search unavailable");
            return Ok(self.no_match(subject));
        };

        let query = engine.embed_query(question).await?;
        let threshold = self.settings.retrieval.similarity_threshold;

        debug!("Strategy 1: local knowledge base");
        if let Some(candidate) = self.search_knowledge_base(&query, threshold) {
            return Ok(self.finish(question, candidate).await);
        }

        debug!("Strategy 2: ScienceQA");
        let scienceqa_best = self.scienceqa.best_match(&query);
        if let Some(m) = scienceqa_best.filter(|m| m.score > threshold) {
            info!("Found in ScienceQA (similarity: {:.2})", m.score);
            return Ok(self.finish(question, scienceqa_candidate(m)).await);
        }

        debug!("Strategy 3: MMLU");
        let mmlu_best = match subject {
            Some(subject) => {
                let config = subject.mmlu_subject();
                self.mmlu.best_match_where(&query, |row| row.subject == config)
            }
            None => self.mmlu.best_match(&query),
        };
        if let Some(m) = mmlu_best.filter(|m| m.score > threshold) {
            info!("Found in MMLU (similarity: {:.2})", m.score);
            return Ok(self.finish(question, mmlu_candidate(m)).await);
        }

        debug!("Strategy 4: SciQ");
        if let Some(m) = self.sciq.best_match(&query).filter(|m| m.score > threshold) {
            info!("Found in SciQ (similarity: {:.2})", m.score);
            return Ok(self.finish(question, sciq_candidate(m)).await);
        }

        let related_threshold = self.settings.retrieval.related_threshold;
        let related = [
            scienceqa_best.map(scienceqa_candidate),
            mmlu_best.map(mmlu_candidate),
        ]
        .into_iter()
        .flatten()
        .filter(|c| c.response.confidence > related_threshold)
        .fold(None::<Candidate>, |best, c| match best {
            Some(b) if b.response.confidence >= c.response.confidence => Some(b),
            _ => Some(c),
        });

        if let Some(candidate) = related {
            info!(
                "Returning related match (similarity: {:.2})",
                candidate.response.confidence
            );
            let candidate = self.as_related(candidate, subject);
            return Ok(self.finish(question, candidate).await);
        }

        info!("No match found");
        Ok(self.no_match(subject))
    }

    fn newton_law_shortcut(&self, question: &str) -> Option<Candidate> {
        if !question.to_lowercase().contains("newton") {
            return None;
        }
        let law = detect_law_number(question)?;
        let key = NEWTON_LAW_TOPICS.get(usize::from(law).checked_sub(1)?)?;
        let topic = self.knowledge_base.get(Subject::Physics, key)?;
        Some(topic_candidate(topic, NEWTON_LAW_CONFIDENCE))
    }

    fn search_knowledge_base(&self, query: &[f32], threshold: f32) -> Option<Candidate> {
        let m = self.kb_index.best_match(query)?;
        let topic = self.knowledge_base.topics().get(*m.item)?;
        if m.score > threshold {
            info!("Found in KB: {} (similarity: {:.2})", topic.key, m.score);
            Some(topic_candidate(topic, m.score))
        } else {
            debug!("Best KB topic {} below threshold ({:.2})", topic.key, m.score);
            None
        }
    }

    fn as_related(&self, candidate: Candidate, subject: Option<Subject>) -> Candidate {
        let response = candidate.response;
        Candidate {
            response: TutorResponse {
                answer: related_answer(&response.answer),
                subject,
                source: response.source.map(|s| format!("{} (related)", s)),
                confidence: response.confidence * self.settings.retrieval.related_penalty,
                topic: None,
                matched_question: response.matched_question,
                highlight: None,
            },
            passage: None,
        }
    }

    fn no_match(&self, subject: Option<Subject>) -> TutorResponse {
        TutorResponse {
            subject,
            ..TutorResponse::message(no_match_message(subject))
        }
    }

    /// Attach the extractive highlight, if the passage yields one.
    async fn finish(&self, question: &str, candidate: Candidate) -> TutorResponse {
        let mut response = candidate.response;
        if let Some(passage) = candidate.passage {
            response.highlight = self.extract_span(question, &passage).await;
        }
        response
    }

    async fn extract_span(&self, question: &str, passage: &str) -> Option<AnswerSpan> {
        match self.qa.answer(&QaRequest::new(question, passage)).await {
            Ok(answer) if answer.score >= self.settings.qa_min_score => {
                let text = answer.answer.trim();
                if text.is_empty() {
                    return None;
                }
                debug!("Extracted answer span (score {:.2})", answer.score);
                Some(AnswerSpan {
                    text: text.to_string(),
                    score: answer.score,
                })
            }
            Ok(answer) => {
                debug!("Extracted span below minimum score ({:.2})", answer.score);
                None
            }
            Err(e) => {
                warn!("Extractive QA failed: {}", e);
                None
            }
        }
    }

    /// The last few questions, formatted for display.
    pub fn history_summary(&self) -> AppResult<String> {
        Ok(self.lock_history()?.summary())
    }

    pub fn history(&self) -> AppResult<Vec<String>> {
        Ok(self.lock_history()?.questions())
    }

    pub fn last_subject(&self) -> AppResult<Option<Subject>> {
        Ok(self.lock_history()?.last_subject())
    }

    pub fn has_semantic_search(&self) -> bool {
        self.engine.is_some()
    }

    pub fn stats(&self) -> TutorStats {
        let cached_embeddings = self.engine.as_ref().and_then(|engine| {
            engine.cached_count().unwrap_or_else(|e| {
                warn!("Failed to count cached embeddings: {}", e);
                None
            })
        });

        TutorStats {
            knowledge_base_topics: self.knowledge_base.len(),
            topics_by_subject: self.knowledge_base.subject_counts(),
            datasets: self.dataset_counts.clone(),
            indexed: IndexSizes {
                knowledge_base: self.kb_index.len(),
                scienceqa: self.scienceqa.len(),
                mmlu: self.mmlu.len(),
                sciq: self.sciq.len(),
            },
            semantic_search: self.engine.is_some(),
            embedding_provider: self.engine.as_ref().map(|e| e.provider_name().to_string()),
            embedding_model: self.engine.as_ref().map(|e| e.model_name().to_string()),
            embedding_dimensions: self.engine.as_ref().map(|e| e.dimensions()),
            cached_embeddings,
            qa_provider: self.qa.provider_name().to_string(),
            qa_model: self.qa.model_name().to_string(),
        }
    }
}

async fn encode_dataset<T, F>(
    engine: &EmbeddingEngine,
    name: &str,
    rows: Option<Vec<T>>,
    text_of: F,
) -> SemanticIndex<T>
where
    F: Fn(&T) -> String,
{
    let Some(rows) = rows else {
        return SemanticIndex::new();
    };

    info!("Encoding {} {} questions", rows.len(), name);
    match engine.build_index(rows, text_of).await {
        Ok(index) => index,
        Err(e) => {
            warn!("{} disabled, encoding failed: {}", name, e);
            SemanticIndex::new()
        }
    }
}

fn topic_candidate(topic: &Topic, confidence: f32) -> Candidate {
    Candidate {
        response: TutorResponse {
            answer: format_answer_with_steps(&topic.content, Some(&topic.key)),
            subject: Some(topic.subject),
            source: Some(Source::KnowledgeBase.label().to_string()),
            confidence,
            topic: Some(topic.key.clone()),
            matched_question: None,
            highlight: None,
        },
        passage: Some(topic.content.clone()),
    }
}

fn scienceqa_candidate(m: ScoredMatch<'_, ScienceQaRow>) -> Candidate {
    Candidate {
        response: TutorResponse {
            source: Some(Source::ScienceQa.label().to_string()),
            confidence: m.score,
            matched_question: Some(m.item.question.clone()),
            ..TutorResponse::message(format_scienceqa(m.item))
        },
        passage: m.item.passage(),
    }
}

fn mmlu_candidate(m: ScoredMatch<'_, MmluRow>) -> Candidate {
    Candidate {
        response: TutorResponse {
            source: Some(Source::Mmlu.label().to_string()),
            confidence: m.score,
            matched_question: Some(m.item.question.clone()),
            ..TutorResponse::message(format_mmlu(m.item))
        },
        passage: None,
    }
}

fn sciq_candidate(m: ScoredMatch<'_, SciqRow>) -> Candidate {
    Candidate {
        response: TutorResponse {
            source: Some(Source::Sciq.label().to_string()),
            confidence: m.score,
            matched_question: Some(m.item.question.clone()),
            ..TutorResponse::message(m.item.correct_answer.clone())
        },
        passage: m.item.support().map(str::to_string),
    }
}
