//! Curated knowledge base.
//!
//! A small, hand-written set of high school topics. It is searched before any
//! dataset, so its passages are written as complete explanations with worked
//! examples.

use crate::subjects::Subject;
use serde::{Deserialize, Serialize};
use stemtutor_core::{AppError, AppResult};

const BUILTIN_TOPICS: &str = include_str!("../data/curated.yaml");

/// A single curated topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub subject: Subject,
    pub key: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub content: String,
}

impl Topic {
    /// Text encoded for semantic search: key, keywords, then content.
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.key, self.keywords.join(" "), self.content)
    }
}

/// Ordered collection of curated topics.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    topics: Vec<Topic>,
}

impl KnowledgeBase {
    /// The topics shipped with the tutor.
    pub fn builtin() -> AppResult<Self> {
        Self::from_yaml(BUILTIN_TOPICS)
    }

    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        let topics: Vec<Topic> = serde_yaml::from_str(yaml)?;
        Self::from_topics(topics)
    }

    /// Build from topics, rejecting duplicate `(subject, key)` pairs.
    pub fn from_topics(topics: Vec<Topic>) -> AppResult<Self> {
        for (i, topic) in topics.iter().enumerate() {
            if topics[..i]
                .iter()
                .any(|t| t.subject == topic.subject && t.key == topic.key)
            {
                return Err(AppError::Knowledge(format!(
                    "Duplicate topic '{}' in {}",
                    topic.key, topic.subject
                )));
            }
        }
        Ok(Self { topics })
    }

    pub fn get(&self, subject: Subject, key: &str) -> Option<&Topic> {
        self.topics
            .iter()
            .find(|t| t.subject == subject && t.key == key)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Topic count per subject, in detection order.
    pub fn subject_counts(&self) -> Vec<(Subject, usize)> {
        Subject::ALL
            .into_iter()
            .map(|s| (s, self.topics.iter().filter(|t| t.subject == s).count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_topics() {
        let kb = KnowledgeBase::builtin().unwrap();
        assert_eq!(kb.len(), 16);
        assert_eq!(kb.topics()[0].key, "motion");
        assert_eq!(
            kb.subject_counts(),
            vec![
                (Subject::Physics, 6),
                (Subject::Chemistry, 4),
                (Subject::Biology, 4),
                (Subject::Math, 2),
            ]
        );
    }

    #[test]
    fn test_get_newton_laws() {
        let kb = KnowledgeBase::builtin().unwrap();
        for key in ["newtons_first_law", "newtons_second_law", "newtons_third_law"] {
            let topic = kb.get(Subject::Physics, key).unwrap();
            assert!(topic.content.contains("Newton's"));
        }
        assert!(kb.get(Subject::Chemistry, "newtons_first_law").is_none());
    }

    #[test]
    fn test_embedding_text() {
        let topic = Topic {
            subject: Subject::Chemistry,
            key: "atom".to_string(),
            keywords: vec!["atom".to_string(), "atomic".to_string()],
            content: "Smallest unit.".to_string(),
        };
        assert_eq!(topic.embedding_text(), "atom atom atomic Smallest unit.");
    }

    #[test]
    fn test_duplicate_topics_rejected() {
        let yaml = r#"
- subject: math
  key: slope
  content: Rise over run.
- subject: math
  key: slope
  content: Again.
"#;
        assert!(KnowledgeBase::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_unknown_subject_rejected() {
        let yaml = "- subject: history\n  key: rome\n  content: Old.\n";
        assert!(KnowledgeBase::from_yaml(yaml).is_err());
    }
}
