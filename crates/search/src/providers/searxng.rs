//! SearXNG metasearch provider.
//!
//! Uses the JSON output of a SearXNG instance (`/search?format=json`). The
//! instance must have the `json` format enabled in its settings.

use crate::provider::{RawDocument, SearchProvider};
use delve_core::{AppError, AppResult};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: Option<String>,
}

/// SearXNG search client.
pub struct SearxngProvider {
    base_url: String,
    max_results: usize,
    client: reqwest::Client,
}

impl SearxngProvider {
    /// Create a provider for the instance at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
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
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results,
            client,
        })
    }

    fn convert(&self, response: SearxngResponse) -> Vec<RawDocument> {
        response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(self.max_results)
            .map(|r| RawDocument::new(r.title, r.url, r.content.unwrap_or_default()))
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxngProvider {
    fn provider_name(&self) -> &str {
        "searxng"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<RawDocument>> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| AppError::search(query, format!("request to SearXNG failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::search(
                query,
                format!("SearXNG returned {}", response.status()),
            ));
        }

        let body: SearxngResponse = response
            .json()
            .await
            .map_err(|e| AppError::search(query, format!("invalid SearXNG response: {}", e)))?;

        let documents = self.convert(body);
        tracing::debug!(query, count = documents.len(), "SearXNG search finished");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_caps_and_skips_empty_urls() {
        let provider = SearxngProvider::new("http://localhost:8080/", 2, None).unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080");

        let body: SearxngResponse = serde_json::from_str(
            r#"{"results": [
                {"title": "A", "url": "https://a.test", "content": "alpha"},
                {"title": "No link", "url": ""},
                {"title": "B", "url": "https://b.test"},
                {"title": "C", "url": "https://c.test", "content": "gamma"}
            ]}"#,
        )
        .unwrap();

        let docs = provider.convert(body);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], RawDocument::new("A", "https://a.test", "alpha"));
        assert_eq!(docs[1].text, "");
    }
}
