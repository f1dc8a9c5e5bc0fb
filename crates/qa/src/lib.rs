//! Extractive question-answering crate for STEM Tutor.
//!
//! This crate provides a provider-agnostic abstraction over extractive QA
//! models: given a question and a passage, a model selects the answer span
//! inside the passage and reports a confidence score.
//!
//! # Providers
//! - **Hugging Face**: hosted `question-answering` models such as
//!   `distilbert-base-cased-distilled-squad` (default)
//! - **Lexical**: offline sentence-overlap reader for development and tests
//!
//! # Example
//! ```no_run
//! use stemtutor_qa::{QaClient, QaRequest, providers::LexicalReader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = LexicalReader::new();
//! let request = QaRequest::new(
//!     "What is the unit of force?",
//!     "Force is measured in Newtons. Mass is measured in kilograms.",
//! );
//! let answer = reader.answer(&request).await?;
//! println!("{} ({:.2})", answer.answer, answer.score);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{QaAnswer, QaClient, QaRequest};
pub use factory::create_client;
pub use providers::{HuggingFaceClient, LexicalReader};
pub use types::ProviderType;
