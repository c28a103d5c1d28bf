//! Exa neural search provider.
//!
//! Exa returns full page text alongside each hit, which gives the summarizer
//! more to work with than snippet-only engines.

use crate::provider::{RawDocument, SearchProvider};
use delve_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.exa.ai/search";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'static str,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
}

/// Exa search client.
pub struct ExaProvider {
    endpoint: String,
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

impl ExaProvider {
    pub fn new(
        api_key: impl Into<String>,
        max_results: usize,
        timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            max_results,
            client,
        })
    }

    /// Point the client at a different search endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl SearchProvider for ExaProvider {
    fn provider_name(&self) -> &str {
        "exa"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<RawDocument>> {
        let request = ExaSearchRequest {
            query,
            num_results: self.max_results,
            search_type: "auto",
            contents: ExaContents { text: true },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::search(query, format!("request to Exa failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::search(
                query,
                format!("Exa returned {}: {}", status, error_text),
            ));
        }

        let body: ExaSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::search(query, format!("invalid Exa response: {}", e)))?;

        let documents: Vec<RawDocument> = body
            .results
            .into_iter()
            .map(|r| {
                let title = r.title.unwrap_or_else(|| r.url.clone());
                RawDocument::new(title, r.url, r.text.unwrap_or_default())
            })
            .collect();

        tracing::debug!(query, count = documents.len(), "Exa search finished");
        Ok(documents)
    }
}
