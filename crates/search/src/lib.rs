//! Web search pipeline for delve.
//!
//! - [`SearchProvider`] abstracts the search engine (SearXNG, Exa)
//! - [`SearchCache`] persists results per query on disk
//! - [`DocumentSummarizer`] condenses fetched pages with a model
//! - [`SearchExecutor`] fans a query batch out and merges the results

pub mod cache;
pub mod executor;
pub mod provider;
pub mod providers;
pub mod summarize;
pub mod types;

pub use cache::{cache_key, CacheEntry, CacheStats, SearchCache};
pub use executor::SearchExecutor;
pub use provider::{create_provider, RawDocument, SearchProvider};
pub use providers::{ExaProvider, SearxngProvider};
pub use summarize::DocumentSummarizer;
pub use types::{truncate_chars, truncate_query, Document, ResultSet, MAX_QUERY_CHARS};
