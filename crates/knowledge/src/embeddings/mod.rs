//! Semantic embedding engine.
//!
//! Provider-agnostic embedding generation with an optional persistent cache.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::cache::EmbeddingCache;
use crate::index::SemanticIndex;
use std::path::Path;
use std::sync::{Arc, Mutex};
use stemtutor_core::{AppError, AppResult};

/// Wraps an embedding provider with batching and caching.
pub struct EmbeddingEngine {
    provider: Arc<dyn EmbeddingProvider>,
    config: EmbeddingConfig,
    cache: Option<Mutex<EmbeddingCache>>,
}

impl std::fmt::Debug for EmbeddingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingEngine")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_name())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl EmbeddingEngine {
    /// Create the provider described by `config` and open the cache at
    /// `cache_path`. An unusable cache is logged and skipped.
    pub async fn new(config: EmbeddingConfig, cache_path: Option<&Path>) -> AppResult<Self> {
        tracing::info!(
            "Loading semantic search model: provider={}, model={}, dimensions={}",
            config.provider,
            config.model,
            config.dimensions
        );
        let provider = create_provider(&config).await?;

        let cache = match cache_path {
            Some(path) => match EmbeddingCache::open(path, &config) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    tracing::warn!("Embedding cache disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self::with_provider(provider, config, cache))
    }

    pub fn with_provider(
        provider: Arc<dyn EmbeddingProvider>,
        config: EmbeddingConfig,
        cache: Option<EmbeddingCache>,
    ) -> Self {
        Self {
            provider,
            config,
            cache: cache.map(Mutex::new),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    fn lock_cache(&self) -> AppResult<Option<std::sync::MutexGuard<'_, EmbeddingCache>>> {
        self.cache
            .as_ref()
            .map(|m| {
                m.lock()
                    .map_err(|_| AppError::Knowledge("Embedding cache lock poisoned".to_string()))
            })
            .transpose()
    }

    /// Embed a user query. Queries are not cached.
    pub async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        self.provider.embed(text).await
    }

    /// Embed many texts, serving what it can from the cache and sending the
    /// rest to the provider in batches of `batch_size`.
    pub async fn embed_texts(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<Option<Vec<f32>>> = match self.lock_cache()? {
            Some(cache) => texts
                .iter()
                .map(|t| cache.get(t))
                .collect::<AppResult<_>>()?,
            None => vec![None; texts.len()],
        };

        let missing: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(
            "Embedding {} texts ({} cached) with {}",
            texts.len(),
            texts.len() - missing.len(),
            self.provider.provider_name()
        );

        let batch_size = self.config.batch_size.max(1);
        for batch in missing.chunks(batch_size) {
            let batch_texts: Vec<String> = batch.iter().map(|&i| texts[i].clone()).collect();
            let embeddings = self.provider.embed_batch(&batch_texts).await?;
            if embeddings.len() != batch_texts.len() {
                return Err(AppError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    batch_texts.len()
                )));
            }

            if let Some(mut cache) = self.lock_cache()? {
                let entries: Vec<(String, Vec<f32>)> =
                    batch_texts.into_iter().zip(embeddings.iter().cloned()).collect();
                if let Err(e) = cache.put_many(&entries) {
                    tracing::warn!("Failed to write embedding cache: {}", e);
                }
            }

            for (&i, embedding) in batch.iter().zip(embeddings) {
                results[i] = Some(embedding);
            }
        }

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| AppError::Embedding("Missing embedding".to_string())))
            .collect()
    }

    /// Encode `items` once and pair them with their vectors.
    pub async fn build_index<T, F>(&self, items: Vec<T>, text_of: F) -> AppResult<SemanticIndex<T>>
    where
        F: Fn(&T) -> String,
    {
        let texts: Vec<String> = items.iter().map(&text_of).collect();
        let embeddings = self.embed_texts(&texts).await?;
        SemanticIndex::from_parts(items, embeddings)
    }

    /// Number of vectors in the persistent cache, if one is attached.
    pub fn cached_count(&self) -> AppResult<Option<usize>> {
        match self.lock_cache()? {
            Some(cache) => cache.len().map(Some),
            None => Ok(None),
        }
    }
}
