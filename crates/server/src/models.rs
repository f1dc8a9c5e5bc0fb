//! Request and response bodies of the JSON API.

use serde::{Deserialize, Serialize};
use stemtutor_knowledge::tutor::AnswerSpan;
use stemtutor_knowledge::{Subject, TutorResponse, TutorStats};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Missing, null and empty are all treated as no message
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful chat reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<AnswerSpan>,
}

impl From<TutorResponse> for ChatResponse {
    fn from(reply: TutorResponse) -> Self {
        Self {
            response: reply.answer,
            confidence: reply.confidence,
            source: reply.source,
            subject: reply.subject,
            topic: reply.topic,
            matched_question: reply.matched_question,
            highlight: reply.highlight,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub summary: String,
    pub questions: Vec<String>,
}

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the server started
    pub uptime: u64,
    pub stats: TutorStats,
}
