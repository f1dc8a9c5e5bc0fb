//! Tutor orchestration.
//!
//! Answers a question by trying, in order: the curated knowledge base,
//! ScienceQA, MMLU and SciQ. A source only answers when its best match scores
//! above the similarity threshold; if none does, the closest ScienceQA or MMLU
//! question is offered as related information at a reduced confidence.

pub mod bot;
pub mod format;
pub mod history;
pub mod types;

pub use bot::{IndexSizes, TutorBot, TutorSettings, TutorStats};
pub use format::format_answer_with_steps;
pub use history::ConversationHistory;
pub use types::{AnswerSpan, ConfidenceLevel, Source, TutorResponse};
