//! Persistent embedding cache.
//!
//! Encoding every dataset question on each start is the slowest part of
//! bringing the tutor up, so vectors are kept in SQLite keyed by the SHA-256 of
//! the encoded text. The `meta` table pins the provider, model and dimensions
//! that produced the vectors; opening the cache with a different embedding
//! configuration wipes it.

use crate::embeddings::EmbeddingConfig;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use stemtutor_core::{AppError, AppResult};

/// SQLite-backed store of text embeddings.
#[derive(Debug)]
pub struct EmbeddingCache {
    conn: Connection,
}

impl EmbeddingCache {
    /// Open (or create) the cache file for the given embedding configuration.
    pub fn open(db_path: &Path, config: &EmbeddingConfig) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create cache directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open embedding cache: {}", e)))?;
        tracing::debug!("Opened embedding cache at {:?}", db_path);

        Self::init(conn, config)
    }

    /// Cache that lives only as long as the process.
    pub fn in_memory(config: &EmbeddingConfig) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open embedding cache: {}", e)))?;
        Self::init(conn, config)
    }

    fn init(conn: Connection, config: &EmbeddingConfig) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS embeddings (
                hash TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create cache tables: {}", e)))?;

        let mut cache = Self { conn };
        cache.check_meta(config)?;
        Ok(cache)
    }

    fn meta_value(&self, key: &str) -> AppResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| AppError::Knowledge(format!("Failed to read cache metadata: {}", e)))
    }

    fn stored_config(&self) -> AppResult<Option<EmbeddingConfig>> {
        let provider = self.meta_value("provider")?;
        let model = self.meta_value("model")?;
        let dimensions = self.meta_value("dimensions")?;

        Ok(match (provider, model, dimensions) {
            (Some(provider), Some(model), Some(dimensions)) => Some(EmbeddingConfig {
                provider,
                model,
                dimensions: dimensions.parse().unwrap_or(0),
                ..EmbeddingConfig::default()
            }),
            _ => None,
        })
    }

    fn check_meta(&mut self, config: &EmbeddingConfig) -> AppResult<()> {
        match self.stored_config()? {
            Some(stored) => match stored.validate_consistency(config) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::info!("Embedding cache invalidated: {}", e);
                    self.clear()?;
                }
            },
            None => tracing::debug!("Initializing embedding cache metadata"),
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;
        for (key, value) in [
            ("provider", config.provider.clone()),
            ("model", config.model.clone()),
            ("dimensions", config.dimensions.to_string()),
        ] {
            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to write cache metadata: {}", e)))?;
        }
        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit cache metadata: {}", e)))
    }

    /// Look up a cached vector. Corrupt entries count as misses.
    pub fn get(&self, text: &str) -> AppResult<Option<Vec<f32>>> {
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT embedding FROM embeddings WHERE hash = ?1",
                params![text_key(text)],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Knowledge(format!("Failed to query embedding cache: {}", e)))?;

        Ok(bytes.and_then(|b| match bytes_to_embedding(&b) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache entry: {}", e);
                None
            }
        }))
    }

    /// Store vectors for the given texts in a single transaction.
    pub fn put_many(&mut self, entries: &[(String, Vec<f32>)]) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let created_at = chrono::Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO embeddings (hash, embedding, created_at)
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;
            for (text, embedding) in entries {
                stmt.execute(params![text_key(text), embedding_to_bytes(embedding), created_at])
                    .map_err(|e| {
                        AppError::Knowledge(format!("Failed to cache embedding: {}", e))
                    })?;
            }
        }
        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit embeddings: {}", e)))?;

        tracing::debug!("Cached {} embeddings", entries.len());
        Ok(())
    }

    /// Number of cached vectors.
    pub fn len(&self) -> AppResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to count embeddings: {}", e)))
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Delete all cached vectors.
    pub fn clear(&mut self) -> AppResult<()> {
        self.conn
            .execute("DELETE FROM embeddings", [])
            .map_err(|e| AppError::Knowledge(format!("Failed to clear embeddings: {}", e)))?;
        Ok(())
    }
}

/// Hex SHA-256 of the text, used as the cache key.
pub fn text_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(format!(
            "Invalid embedding blob length: {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> EmbeddingConfig {
        EmbeddingConfig::trigram(4)
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = EmbeddingCache::in_memory(&config()).unwrap();
        cache
            .put_many(&[("What is inertia?".to_string(), vec![0.5, -1.0, 0.25, 2.0])])
            .unwrap();

        assert_eq!(
            cache.get("What is inertia?").unwrap(),
            Some(vec![0.5, -1.0, 0.25, 2.0])
        );
        assert_eq!(cache.get("What is mass?").unwrap(), None);
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_persists_across_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("embeddings.sqlite");

        {
            let mut cache = EmbeddingCache::open(&path, &config()).unwrap();
            cache
                .put_many(&[("atom".to_string(), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
        }

        let cache = EmbeddingCache::open(&path, &config()).unwrap();
        assert_eq!(cache.get("atom").unwrap(), Some(vec![1.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_config_change_clears_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("embeddings.sqlite");

        {
            let mut cache = EmbeddingCache::open(&path, &config()).unwrap();
            cache
                .put_many(&[("atom".to_string(), vec![1.0, 0.0, 0.0, 0.0])])
                .unwrap();
        }

        let cache = EmbeddingCache::open(&path, &EmbeddingConfig::trigram(8)).unwrap();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.stored_config().unwrap().unwrap().dimensions, 8);
    }

    #[test]
    fn test_corrupt_blob_is_miss() {
        let cache = EmbeddingCache::in_memory(&config()).unwrap();
        cache
            .conn
            .execute(
                "INSERT INTO embeddings (hash, embedding, created_at) VALUES (?1, ?2, 'now')",
                params![text_key("bad"), vec![1u8, 2, 3]],
            )
            .unwrap();

        assert_eq!(cache.get("bad").unwrap(), None);
    }

    #[test]
    fn test_text_key_is_sha256_hex() {
        assert_eq!(
            text_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
