//! Offline lexical reader.
//!
//! Selects the sentence of the context that covers the largest share of the
//! question's content words. It needs no model download, which makes it the
//! reader of choice for development machines and tests.

use crate::client::{QaAnswer, QaClient, QaRequest};
use std::collections::HashSet;
use stemtutor_core::{AppError, AppResult};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "why", "does", "do", "who", "when",
    "where", "can", "you", "explain", "tell", "about",
];

/// Sentence-overlap extractive reader.
#[derive(Debug, Default, Clone)]
pub struct LexicalReader;

impl LexicalReader {
    pub fn new() -> Self {
        Self
    }
}

fn content_terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Split text into trimmed sentences, returning `(start, end)` byte ranges.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?' | '\n') {
            let end = idx + ch.len_utf8();
            push_trimmed(text, start, end, &mut spans);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut spans);

    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        let s = start + leading;
        spans.push((s, s + trimmed.len()));
    }
}

#[async_trait::async_trait]
impl QaClient for LexicalReader {
    fn provider_name(&self) -> &str {
        "lexical"
    }

    fn model_name(&self) -> &str {
        "sentence-overlap"
    }

    async fn answer(&self, request: &QaRequest) -> AppResult<QaAnswer> {
        let question_terms = content_terms(&request.question);
        if question_terms.is_empty() {
            return Err(AppError::Qa(
                "Question has no content words to match".to_string(),
            ));
        }

        let spans = sentence_spans(&request.context);
        let mut best: Option<((usize, usize), usize)> = None;

        for span in spans {
            let sentence_terms = content_terms(&request.context[span.0..span.1]);
            let overlap = question_terms.intersection(&sentence_terms).count();
            if best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
                best = Some((span, overlap));
            }
        }

        let ((start, end), overlap) =
            best.ok_or_else(|| AppError::Qa("Context contains no sentences".to_string()))?;

        Ok(QaAnswer {
            answer: request.context[start..end].to_string(),
            score: overlap as f32 / question_terms.len() as f32,
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "Photosynthesis happens in chloroplasts. \
        Chlorophyll absorbs light energy! Plants release oxygen as a by-product.";

    #[tokio::test]
    async fn test_selects_best_sentence() {
        let reader = LexicalReader::new();
        let answer = reader
            .answer(&QaRequest::new("Which pigment absorbs light energy?", CONTEXT))
            .await
            .unwrap();

        assert_eq!(answer.answer, "Chlorophyll absorbs light energy!");
        assert_eq!(&CONTEXT[answer.start..answer.end], answer.answer);
        assert!(answer.score > 0.5);
    }

    #[tokio::test]
    async fn test_ties_prefer_earliest_sentence() {
        let reader = LexicalReader::new();
        let answer = reader
            .answer(&QaRequest::new("Where is glucose stored?", CONTEXT))
            .await
            .unwrap();

        assert_eq!(answer.score, 0.0);
        assert_eq!(answer.answer, "Photosynthesis happens in chloroplasts.");
    }

    #[tokio::test]
    async fn test_question_without_content_words() {
        let reader = LexicalReader::new();
        let result = reader.answer(&QaRequest::new("What is it?", CONTEXT)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_context() {
        let reader = LexicalReader::new();
        let result = reader
            .answer(&QaRequest::new("Which pigment absorbs light?", "   "))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_sentence_spans_handle_unicode() {
        let text = "v = Δx/Δt. a = Δv/Δt";
        let spans = sentence_spans(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[1].0..spans[1].1], "a = Δv/Δt");
    }
}
