//! Bounded conversation history.

use crate::subjects::Subject;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ConversationHistory {
    questions: VecDeque<String>,
    max_len: usize,
    last_subject: Option<Subject>,
}

impl ConversationHistory {
    pub fn new(max_len: usize) -> Self {
        Self {
            questions: VecDeque::with_capacity(max_len),
            max_len: max_len.max(1),
            last_subject: None,
        }
    }

    /// Append a question, evicting the oldest once full.
    pub fn record(&mut self, question: &str) {
        self.questions.push_back(question.to_string());
        while self.questions.len() > self.max_len {
            self.questions.pop_front();
        }
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.last_subject = Some(subject);
    }

    pub fn last_subject(&self) -> Option<Subject> {
        self.last_subject
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.iter().cloned().collect()
    }

    /// The last three questions as a numbered list.
    pub fn summary(&self) -> String {
        if self.questions.is_empty() {
            return "No conversation history yet.".to_string();
        }

        let skip = self.questions.len().saturating_sub(3);
        let lines: Vec<String> = self
            .questions
            .iter()
            .skip(skip)
            .enumerate()
            .map(|(i, q)| format!("  {}. {}", i + 1, q))
            .collect();

        format!("Recent questions:\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut history = ConversationHistory::new(2);
        history.record("a?");
        history.record("b?");
        history.record("c?");
        assert_eq!(history.questions(), vec!["b?", "c?"]);
    }

    #[test]
    fn test_summary() {
        let mut history = ConversationHistory::new(5);
        assert_eq!(history.summary(), "No conversation history yet.");

        for q in ["one", "two", "three", "four"] {
            history.record(q);
        }
        assert_eq!(
            history.summary(),
            "Recent questions:\n  1. two\n  2. three\n  3. four"
        );
    }

    #[test]
    fn test_last_subject() {
        let mut history = ConversationHistory::new(5);
        assert_eq!(history.last_subject(), None);
        history.set_subject(Subject::Math);
        assert_eq!(history.last_subject(), Some(Subject::Math));
    }
}
