//! Extractive QA provider implementations.

pub mod huggingface;
pub mod lexical;

pub use huggingface::HuggingFaceClient;
pub use lexical::LexicalReader;
