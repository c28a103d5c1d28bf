//! LLM provider factory.
//!
//! Creates LLM clients from a provider name, resolving endpoints and
//! required secrets.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use delve_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required by "openai")
/// * `timeout` - Optional transport timeout
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let mut client = OllamaClient::with_base_url(base_url);
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let mut client = match endpoint {
                Some(base_url) => OpenAiClient::with_base_url(base_url, api_key),
                None => OpenAiClient::new(api_key),
            };
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
