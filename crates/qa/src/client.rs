//! Extractive QA client abstraction and request/response types.

use serde::{Deserialize, Serialize};
use stemtutor_core::AppResult;

/// Extractive QA request: a question and the passage to search for the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    /// The question text
    pub question: String,

    /// The passage the answer span is extracted from
    pub context: String,
}

impl QaRequest {
    /// Create a new QA request.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
        }
    }
}

/// Extracted answer span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    /// The answer text as it appears in the context
    pub answer: String,

    /// Model confidence in the span (0.0 - 1.0)
    pub score: f32,

    /// Byte offset where the span starts in the context
    pub start: usize,

    /// Byte offset where the span ends in the context
    pub end: usize,
}

/// Trait for extractive QA providers.
///
/// Implementations must be cheap to share across request handlers; the bot
/// keeps a single instance for the lifetime of the process.
#[async_trait::async_trait]
pub trait QaClient: Send + Sync {
    /// Get the provider name (e.g., "huggingface", "lexical").
    fn provider_name(&self) -> &str;

    /// Get the model identifier.
    fn model_name(&self) -> &str;

    /// Extract the answer span for a question from its context.
    async fn answer(&self, request: &QaRequest) -> AppResult<QaAnswer>;
}
