//! Row types for the question datasets.

use serde::{Deserialize, Serialize};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Letter label for a zero-based choice index (`0` → `A`).
pub fn choice_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map(char::from)
        .unwrap_or('?')
}

/// ScienceQA multiple choice question with its lecture and worked solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScienceQaRow {
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: usize,
    #[serde(default)]
    pub lecture: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl ScienceQaRow {
    pub fn correct_choice(&self) -> Option<&str> {
        self.choices.get(self.answer).map(String::as_str)
    }

    pub fn lecture(&self) -> Option<&str> {
        non_empty(&self.lecture)
    }

    pub fn solution(&self) -> Option<&str> {
        non_empty(&self.solution)
    }

    /// Explanatory passage for the extractive reader.
    pub fn passage(&self) -> Option<String> {
        match (self.lecture(), self.solution()) {
            (Some(l), Some(s)) => Some(format!("{}\n{}", l, s)),
            (Some(l), None) => Some(l.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        }
    }
}

/// SciQ crowd-sourced science question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SciqRow {
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub support: Option<String>,
    #[serde(default)]
    pub distractor1: Option<String>,
    #[serde(default)]
    pub distractor2: Option<String>,
    #[serde(default)]
    pub distractor3: Option<String>,
}

impl SciqRow {
    pub fn support(&self) -> Option<&str> {
        non_empty(&self.support)
    }
}

/// MMLU multiple choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmluRow {
    pub question: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: usize,
    /// MMLU configuration the row came from, e.g. `high_school_physics`.
    #[serde(default)]
    pub subject: String,
}

impl MmluRow {
    pub fn correct_choice(&self) -> Option<&str> {
        self.choices.get(self.answer).map(String::as_str)
    }
}
