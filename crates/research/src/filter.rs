//! Relevance filtering of gathered sources.

use crate::synthesize::format_sources;
use crate::types::{SourceList, SOURCES};
use delve_core::AppResult;
use delve_llm::{generate_typed, Generator};
use delve_prompt::{defaults, PromptLibrary};
use delve_search::ResultSet;
use std::collections::HashSet;
use std::sync::Arc;

/// Sources chosen by the filter, most relevant first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredSources {
    pub results: ResultSet,
    /// 1-based positions in the input, parallel to `results`
    pub indices: Vec<usize>,
}

pub struct SourceFilter {
    generator: Arc<dyn Generator>,
    prompts: PromptLibrary,
    max_sources: usize,
}

impl SourceFilter {
    pub fn new(generator: Arc<dyn Generator>, prompts: PromptLibrary, max_sources: usize) -> Self {
        Self {
            generator,
            prompts,
            max_sources,
        }
    }

    /// Ask the model which of `results` matter for `topic`.
    pub async fn filter(&self, topic: &str, results: &ResultSet) -> AppResult<FilteredSources> {
        if results.is_empty() {
            return Ok(FilteredSources::default());
        }

        let sources = format_sources(results);
        let max_sources = self.max_sources.to_string();
        let prompt = self.prompts.render(
            defaults::FILTER,
            [
                ("topic", topic),
                ("sources", sources.as_str()),
                ("max_sources", max_sources.as_str()),
            ],
        )?;

        let list: SourceList =
            generate_typed(self.generator.as_ref(), &prompt.system, &prompt.user, &SOURCES).await?;

        let selected = select_sources(results, &list.sources, self.max_sources);
        tracing::info!(
            candidates = results.len(),
            kept = selected.results.len(),
            "Filtered sources"
        );
        Ok(selected)
    }
}

/// Resolve model-chosen 1-based indices against `results`.
///
/// Out-of-range indices are dropped, repeats keep their first position, and
/// at most `max_sources` survive in the order given.
pub fn select_sources(results: &ResultSet, indices: &[i64], max_sources: usize) -> FilteredSources {
    let mut seen = HashSet::new();
    let kept: Vec<usize> = indices
        .iter()
        .filter_map(|&n| usize::try_from(n).ok())
        .filter(|&n| n >= 1 && n <= results.len())
        .filter(|&n| seen.insert(n))
        .take(max_sources)
        .collect();

    let dropped = indices.len() - kept.len();
    if dropped > 0 {
        tracing::debug!(dropped, "Ignored invalid, repeated or excess source indices");
    }

    FilteredSources {
        results: kept
            .iter()
            .filter_map(|&n| results.get(n - 1).cloned())
            .collect(),
        indices: kept,
    }
}
