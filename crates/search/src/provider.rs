//! Search provider trait and factory.

use delve_core::{AppError, AppResult, SearchConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::providers::{ExaProvider, SearxngProvider};

/// A document as returned by a search provider, before summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub title: String,
    pub url: String,
    /// Extracted page text; empty when the provider had none
    pub text: String,
}

impl RawDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Trait for web search providers.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get provider name (e.g., "searxng", "exa")
    fn provider_name(&self) -> &str;

    /// Run one query and return documents in provider rank order.
    async fn search(&self, query: &str) -> AppResult<Vec<RawDocument>>;
}

/// Create a search provider based on configuration.
pub fn create_provider(
    config: &SearchConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn SearchProvider>> {
    let timeout = config.timeout.map(Duration::from_secs);

    match config.provider.as_str() {
        "searxng" => {
            let endpoint = config.endpoint.as_deref().unwrap_or("http://localhost:8080");
            let provider = SearxngProvider::new(endpoint, config.max_results, timeout)?;
            Ok(Arc::new(provider))
        }

        "exa" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Exa search provider requires API key".to_string())
            })?;
            let mut provider = ExaProvider::new(api_key, config.max_results, timeout)?;
            if let Some(ref endpoint) = config.endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown search provider: '{}'. Supported providers: searxng, exa",
            config.provider
        ))),
    }
}
