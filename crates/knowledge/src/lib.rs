//! Retrieval and tutoring for STEM Tutor.
//!
//! Semantic search over a curated knowledge base and local question datasets,
//! with extractive highlighting of the winning passage.

pub mod cache;
pub mod curated;
pub mod datasets;
pub mod embeddings;
pub mod index;
pub mod subjects;
pub mod tutor;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use curated::{KnowledgeBase, Topic};
pub use datasets::{DatasetCatalog, DatasetCounts};
pub use embeddings::{EmbeddingConfig, EmbeddingEngine, EmbeddingProvider};
pub use index::{cosine_similarity, SemanticIndex};
pub use subjects::{detect_law_number, detect_subject, Subject};
pub use tutor::{ConfidenceLevel, TutorBot, TutorResponse, TutorSettings, TutorStats};
