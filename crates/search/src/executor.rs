//! Concurrent search, summarize and cache pipeline.

use crate::cache::SearchCache;
use crate::provider::{RawDocument, SearchProvider};
use crate::summarize::DocumentSummarizer;
use crate::types::{truncate_query, Document, ResultSet};
use delve_core::{AppError, AppResult};
use futures::future::{join_all, try_join_all};
use std::sync::Arc;

/// Runs batches of queries against a provider.
pub struct SearchExecutor {
    provider: Arc<dyn SearchProvider>,
    summarizer: DocumentSummarizer,
    cache: SearchCache,
}

impl SearchExecutor {
    /// Executor without a cache.
    pub fn new(provider: Arc<dyn SearchProvider>, summarizer: DocumentSummarizer) -> Self {
        Self {
            provider,
            summarizer,
            cache: SearchCache::disabled(),
        }
    }

    pub fn with_cache(mut self, cache: SearchCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Run every query concurrently and merge the results.
    ///
    /// Results are concatenated in query submission order, then deduplicated
    /// by URL. If any query fails the whole batch fails and the remaining
    /// queries are abandoned.
    pub async fn execute(&self, queries: &[String]) -> AppResult<ResultSet> {
        tracing::info!(
            provider = self.provider.provider_name(),
            queries = queries.len(),
            "Executing search batch"
        );

        let per_query = try_join_all(queries.iter().map(|q| self.execute_one(q))).await?;

        let merged = per_query
            .into_iter()
            .fold(ResultSet::new(), ResultSet::add)
            .dedup();

        tracing::info!(documents = merged.len(), "Search batch finished");
        Ok(merged)
    }

    /// Search, summarize and cache a single query.
    pub async fn execute_one(&self, query: &str) -> AppResult<ResultSet> {
        let query = truncate_query(query);

        if let Some(cached) = self.cache.get(&query).await {
            return Ok(cached);
        }

        let raw = self.provider.search(&query).await.map_err(|e| match e {
            AppError::Search { .. } => e,
            other => AppError::search(&query, other.to_string()),
        })?;
        tracing::debug!(query = %query, hits = raw.len(), "Provider returned documents");

        let documents = join_all(raw.into_iter().map(|doc| self.summarize(&query, doc))).await;
        let results = ResultSet::from(documents);

        if let Err(e) = self.cache.put(&query, &results).await {
            tracing::warn!(query = %query, "Failed to cache search results: {}", e);
        }

        Ok(results)
    }

    async fn summarize(&self, query: &str, raw: RawDocument) -> Document {
        let document = Document::new(raw.title, raw.url, raw.text);
        if !document.has_text() {
            return document;
        }

        let summary = self.summarizer.summarize(query, &document).await;
        document.with_summary(summary)
    }
}
