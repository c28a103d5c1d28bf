//! Command handlers for the delve CLI.

pub mod cache;
pub mod prompts;
pub mod research;
pub mod search;

pub use cache::CacheCommand;
pub use prompts::PromptsCommand;
pub use research::ResearchCommand;
pub use search::SearchCommand;

use delve_core::config::{AppConfig, ProviderConfig};
use delve_core::AppResult;
use delve_llm::{create_client, Generator, LlmGenerator};
use delve_prompt::PromptLibrary;
use delve_search::{create_provider, SearchCache, SearchProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Generator for `model` on the configured LLM provider.
pub(crate) fn build_generator(config: &AppConfig, model: &str) -> AppResult<Arc<dyn Generator>> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let timeout = match config.get_provider_config(&config.provider) {
        Some(ProviderConfig::Ollama { timeout, .. }) => timeout.map(Duration::from_secs),
        _ => None,
    };

    let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref(), timeout)?;
    tracing::debug!(provider = %config.provider, model, "Created LLM client");
    Ok(Arc::new(LlmGenerator::new(client, model)))
}

/// Search provider from the `search` config section.
pub(crate) fn build_provider(config: &AppConfig) -> AppResult<Arc<dyn SearchProvider>> {
    let api_key = config.resolve_search_api_key();
    create_provider(&config.search, api_key.as_deref())
}

/// Prompt library honoring workspace overrides when the directory exists.
pub(crate) fn prompt_library(config: &AppConfig) -> PromptLibrary {
    let dir = config.prompts_dir();
    if dir.is_dir() {
        PromptLibrary::with_overrides(dir)
    } else {
        PromptLibrary::builtin()
    }
}

/// Cache at `dir` (or the workspace default) unless disabled.
pub(crate) fn search_cache(config: &AppConfig, enabled: bool, dir: Option<&Path>) -> SearchCache {
    if !enabled {
        return SearchCache::disabled();
    }
    match dir {
        Some(dir) => SearchCache::new(dir),
        None => SearchCache::new(config.cache_dir()),
    }
}
