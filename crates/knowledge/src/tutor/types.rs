//! Tutor response types.

use crate::subjects::Subject;
use serde::{Deserialize, Serialize};

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    KnowledgeBase,
    ScienceQa,
    Mmlu,
    Sciq,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::KnowledgeBase => "Local Knowledge Base",
            Source::ScienceQa => "ScienceQA",
            Source::Mmlu => "MMLU",
            Source::Sciq => "SciQ",
        }
    }
}

/// Span picked out of the winning passage by the extractive reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSpan {
    pub text: String,
    pub score: f32,
}

/// Answer to a single chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<AnswerSpan>,
}

impl TutorResponse {
    /// A plain reply with no source and zero confidence.
    pub fn message(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            subject: None,
            source: None,
            confidence: 0.0,
            topic: None,
            matched_question: None,
            highlight: None,
        }
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High confidence match!",
            ConfidenceLevel::Moderate => "Moderate confidence - answer may be approximate",
            ConfidenceLevel::Low => "Low confidence - consider rephrasing your question",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::Low);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(TutorResponse::message("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"answer": "hi", "confidence": 0.0}));
    }

    #[test]
    fn test_subject_serializes_lowercase() {
        let response = TutorResponse {
            subject: Some(Subject::Physics),
            source: Some(Source::KnowledgeBase.label().to_string()),
            ..TutorResponse::message("F = ma")
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["subject"], "physics");
        assert_eq!(json["source"], "Local Knowledge Base");
    }
}
