//! Error types for STEM Tutor.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, embeddings, extractive QA,
//! datasets and knowledge retrieval.

use thiserror::Error;

/// Unified error type for STEM Tutor.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Semantic embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Extractive QA model errors
    #[error("QA error: {0}")]
    Qa(String),

    /// Dataset loading errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Knowledge base and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Qa("model loading".to_string());
        assert_eq!(err.to_string(), "QA error: model loading");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
