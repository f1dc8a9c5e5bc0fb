//! QA provider factory.
//!
//! Creates extractive QA clients from the configured provider name.

use crate::client::QaClient;
use crate::providers::{HuggingFaceClient, LexicalReader};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create a QA client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("huggingface", "hf", "lexical")
/// * `endpoint` - Optional inference API base URL
/// * `model` - Model identifier (ignored by the lexical reader)
/// * `api_key` - Optional API token
/// * `timeout` - Request timeout for hosted providers
///
/// # Errors
/// Returns an error if the provider is unknown or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    model: &str,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn QaClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::HuggingFace) => {
            if api_key.is_none() {
                tracing::warn!(
                    "No API token configured for Hugging Face; requests may be rate limited"
                );
            }
            let base_url = endpoint.unwrap_or(HuggingFaceClient::DEFAULT_ENDPOINT);
            let client = HuggingFaceClient::new(base_url, model, api_key, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::Lexical) => Ok(Arc::new(LexicalReader::new())),
        None => Err(format!(
            "Unknown QA provider: {}. Supported: huggingface, lexical",
            provider
        )),
    }
}
