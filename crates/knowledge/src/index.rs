//! In-memory semantic ranking.

use stemtutor_core::{AppError, AppResult};

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// A payload with its similarity to a query.
#[derive(Debug, PartialEq)]
pub struct ScoredMatch<'a, T> {
    pub item: &'a T,
    pub score: f32,
}

impl<T> Clone for ScoredMatch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ScoredMatch<'_, T> {}

/// Payloads paired with their precomputed embeddings.
#[derive(Debug, Clone)]
pub struct SemanticIndex<T> {
    entries: Vec<(T, Vec<f32>)>,
}

impl<T> Default for SemanticIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> SemanticIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair items with embeddings produced in the same order.
    pub fn from_parts(items: Vec<T>, embeddings: Vec<Vec<f32>>) -> AppResult<Self> {
        if items.len() != embeddings.len() {
            return Err(AppError::Embedding(format!(
                "Got {} embeddings for {} items",
                embeddings.len(),
                items.len()
            )));
        }

        Ok(Self {
            entries: items.into_iter().zip(embeddings).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the highest positive similarity. Earlier entries win ties.
    pub fn best_match(&self, query: &[f32]) -> Option<ScoredMatch<'_, T>> {
        self.best_match_where(query, |_| true)
    }

    /// Like [`best_match`](Self::best_match), restricted to entries accepted by `filter`.
    pub fn best_match_where<F>(&self, query: &[f32], filter: F) -> Option<ScoredMatch<'_, T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut best: Option<ScoredMatch<'_, T>> = None;

        for (item, embedding) in &self.entries {
            if !filter(item) {
                continue;
            }
            let score = cosine_similarity(query, embedding);
            if score <= 0.0 {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(ScoredMatch { item, score });
            }
        }

        best
    }

    /// Top `k` entries by similarity, highest first.
    pub fn ranked(&self, query: &[f32], k: usize) -> Vec<ScoredMatch<'_, T>> {
        let mut scored: Vec<ScoredMatch<'_, T>> = self
            .entries
            .iter()
            .map(|(item, embedding)| ScoredMatch {
                item,
                score: cosine_similarity(query, embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }
}
