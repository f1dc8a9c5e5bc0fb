//! Embedding configuration types.

use serde::{Deserialize, Serialize};
use stemtutor_core::config::EmbeddingSettings;
use stemtutor_core::{AppError, AppResult};

/// Embedding configuration for the semantic search model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Provider endpoint (ignored by offline providers)
    pub endpoint: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from(&EmbeddingSettings::default())
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.to_lowercase(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            dimensions: settings.dimensions,
            batch_size: default_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    /// Offline trigram configuration, used by tests and air-gapped installs.
    pub fn trigram(dimensions: usize) -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            endpoint: String::new(),
            dimensions,
            batch_size: default_batch_size(),
        }
    }

    /// Validate that another config produces vectors comparable with this one.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Embedding(format!(
                "Provider mismatch: expected '{}', got '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Embedding(format!(
                "Model mismatch: expected '{}', got '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Embedding(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}
