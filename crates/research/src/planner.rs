//! Query planning and sufficiency evaluation.

use crate::synthesize::format_sources;
use crate::types::{QueryList, QUERIES};
use delve_core::AppResult;
use delve_llm::{generate_typed, Generator};
use delve_prompt::{defaults, PromptLibrary};
use delve_search::ResultSet;
use std::sync::Arc;

/// Proposes search queries for a topic and decides when to stop searching.
pub struct QueryPlanner {
    generator: Arc<dyn Generator>,
    prompts: PromptLibrary,
    max_queries: usize,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn Generator>, prompts: PromptLibrary, max_queries: usize) -> Self {
        Self {
            generator,
            prompts,
            max_queries,
        }
    }

    /// Initial queries for `topic`. An empty list means nothing to search.
    pub async fn plan(&self, topic: &str) -> AppResult<Vec<String>> {
        let max_queries = self.max_queries.to_string();
        let prompt = self.prompts.render(
            defaults::PLAN,
            [("topic", topic), ("max_queries", max_queries.as_str())],
        )?;

        let list: QueryList =
            generate_typed(self.generator.as_ref(), &prompt.system, &prompt.user, &QUERIES).await?;
        let queries = clean(list.queries);

        tracing::info!(count = queries.len(), "Planned initial queries");
        Ok(queries)
    }

    /// Follow-up queries, or an empty list when `results` already suffice.
    ///
    /// Suggestions are not checked against `queries_used`; the model sees
    /// the history and is asked not to repeat it.
    pub async fn evaluate(
        &self,
        topic: &str,
        queries_used: &[String],
        results: &ResultSet,
    ) -> AppResult<Vec<String>> {
        let history = queries_used
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");
        let material = format_sources(results);
        let max_queries = self.max_queries.to_string();

        let prompt = self.prompts.render(
            defaults::EVALUATE,
            [
                ("topic", topic),
                ("queries", history.as_str()),
                ("results", material.as_str()),
                ("max_queries", max_queries.as_str()),
            ],
        )?;

        let list: QueryList =
            generate_typed(self.generator.as_ref(), &prompt.system, &prompt.user, &QUERIES).await?;
        let queries = clean(list.queries);

        if queries.is_empty() {
            tracing::info!("Evaluator judged the material sufficient");
        } else {
            tracing::info!(count = queries.len(), "Evaluator requested more searching");
        }
        Ok(queries)
    }
}

fn clean(queries: Vec<String>) -> Vec<String> {
    queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}
