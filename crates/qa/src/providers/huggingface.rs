//! Hugging Face extractive QA provider.
//!
//! Calls a hosted `question-answering` pipeline (Inference API or a
//! self-hosted endpoint exposing the same contract):
//!
//! ```text
//! POST {endpoint}/models/{model}
//! {"inputs": {"question": "...", "context": "..."}}
//! -> {"answer": "...", "score": 0.97, "start": 12, "end": 19}
//! ```

use crate::client::{QaAnswer, QaClient, QaRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stemtutor_core::{AppError, AppResult};
use tracing::{debug, instrument, warn};

/// Retries after the first failed attempt of a QA request
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Delay before retry number `retry` (1-based): 100ms, 200ms, 400ms.
fn backoff_delay(retry: u32) -> Duration {
    Duration::from_millis(INITIAL_BACKOFF_MS * 2_u64.pow(retry.saturating_sub(1)))
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: InferenceInputs<'a>,
}

#[derive(Debug, Serialize)]
struct InferenceInputs<'a> {
    question: &'a str,
    context: &'a str,
}

/// A single answer as returned by the pipeline. Offsets are character indices.
#[derive(Debug, Clone, Deserialize)]
struct InferenceAnswer {
    answer: String,
    score: f32,
    start: usize,
    end: usize,
}

/// The pipeline returns one object, or a list when `top_k` > 1.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Single(InferenceAnswer),
    Many(Vec<InferenceAnswer>),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Hugging Face question-answering client.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    /// Default hosted inference endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api-inference.huggingface.co";

    /// Create a new client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Qa(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.map(str::to_string),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    /// Send one request (no retries).
    async fn answer_once(&self, request: &QaRequest) -> Result<QaAnswer, (AppError, bool)> {
        let url = self.model_url();
        let body = InferenceRequest {
            inputs: InferenceInputs {
                question: &request.question,
                context: &request.context,
            },
        };

        let mut builder = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            (
                AppError::Qa(format!("Failed to send request to {}: {}", url, e)),
                true,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            // 503 means the model is still loading on the inference server
            let retryable = status == StatusCode::SERVICE_UNAVAILABLE
                || status == StatusCode::TOO_MANY_REQUESTS;
            return Err((
                AppError::Qa(format!("QA API error ({}): {}", status, message)),
                retryable,
            ));
        }

        let parsed: InferenceResponse = response.json().await.map_err(|e| {
            (
                AppError::Qa(format!("Failed to parse QA response: {}", e)),
                false,
            )
        })?;

        into_answer(parsed, &request.context).map_err(|e| (e, false))
    }
}

/// Pick the best answer and convert its character offsets into byte offsets.
fn into_answer(response: InferenceResponse, context: &str) -> AppResult<QaAnswer> {
    let best = match response {
        InferenceResponse::Single(answer) => answer,
        InferenceResponse::Many(answers) => answers
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| AppError::Qa("QA response contained no answers".to_string()))?,
    };

    Ok(QaAnswer {
        start: char_to_byte(context, best.start),
        end: char_to_byte(context, best.end),
        answer: best.answer,
        score: best.score,
    })
}

fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[async_trait::async_trait]
impl QaClient for HuggingFaceClient {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, context_len = request.context.len()))]
    async fn answer(&self, request: &QaRequest) -> AppResult<QaAnswer> {
        if request.question.trim().is_empty() || request.context.trim().is_empty() {
            return Err(AppError::Qa(
                "Question and context must not be empty".to_string(),
            ));
        }

        let mut retries = 0;
        loop {
            match self.answer_once(request).await {
                Ok(answer) => {
                    debug!("Extracted span with score {:.3}", answer.score);
                    return Ok(answer);
                }
                Err((err, retryable)) => {
                    if !retryable || retries >= MAX_RETRIES {
                        return Err(err);
                    }
                    retries += 1;
                    let backoff = backoff_delay(retries);
                    warn!(
                        "QA request failed (retry {}/{}), retrying in {}ms: {}",
                        retries,
                        MAX_RETRIES,
                        backoff.as_millis(),
                        err
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
