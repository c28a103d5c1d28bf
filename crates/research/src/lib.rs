//! Iterative web research for delve.
//!
//! A [`Researcher`] turns a topic into a cited report:
//! 1. Plan search queries and run them ([`ResearchLoop`])
//! 2. Ask whether the material suffices, searching again while budget remains
//! 3. Keep the most relevant sources ([`SourceFilter`])
//! 4. Write the report ([`AnswerSynthesizer`]), optionally revising it on
//!    user feedback
//!
//! Refinement cycles and feedback rounds share one [`IterationBudget`].

pub mod budget;
pub mod feedback;
pub mod filter;
pub mod planner;
pub mod research_loop;
pub mod synthesize;
pub mod types;

#[cfg(test)]
mod tests;

pub use budget::IterationBudget;
pub use feedback::{collect_feedback, is_affirmative, reframe_topic, FeedbackSource, StdinFeedback};
pub use filter::{select_sources, FilteredSources, SourceFilter};
pub use planner::QueryPlanner;
pub use research_loop::ResearchLoop;
pub use synthesize::{format_sources, AnswerSynthesizer};
pub use types::{ResearchOutcome, ResearchReport, SourceRef};

use delve_core::config::STATE_DIR;
use delve_core::{AppResult, ResearchConfig};
use delve_llm::Generator;
use delve_prompt::PromptLibrary;
use delve_search::{DocumentSummarizer, ResultSet, SearchCache, SearchExecutor, SearchProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Research orchestrator with its collaborators injected.
pub struct Researcher {
    generator: Arc<dyn Generator>,
    summarizer: Option<Arc<dyn Generator>>,
    provider: Arc<dyn SearchProvider>,
    config: ResearchConfig,
    prompts: PromptLibrary,
    cache: SearchCache,
    feedback: Option<Arc<dyn FeedbackSource>>,
}

impl Researcher {
    /// Researcher with built-in prompts and no feedback source. The search
    /// cache follows `config.use_cache` and `config.cache_directory`.
    pub fn new(
        generator: Arc<dyn Generator>,
        provider: Arc<dyn SearchProvider>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            generator,
            summarizer: None,
            provider,
            prompts: PromptLibrary::builtin(),
            cache: configured_cache(&config),
            config,
            feedback: None,
        }
    }

    /// Use a separate generator for per-document summaries.
    pub fn with_summarizer(mut self, generator: Arc<dyn Generator>) -> Self {
        self.summarizer = Some(generator);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    /// Solicit feedback on each report through `source` when
    /// `config.interactive` is set.
    pub fn with_feedback(mut self, source: Arc<dyn FeedbackSource>) -> Self {
        self.feedback = Some(source);
        self
    }

    /// Replace the cache derived from the config.
    pub fn with_cache(mut self, cache: SearchCache) -> Self {
        self.cache = cache;
        self
    }

    /// Search executor wired with this researcher's provider, summarizer and cache.
    pub fn executor(&self) -> SearchExecutor {
        let generator = self.summarizer.clone().unwrap_or_else(|| self.generator.clone());
        let summarizer = DocumentSummarizer::new(generator).with_prompts(self.prompts.clone());
        SearchExecutor::new(self.provider.clone(), summarizer).with_cache(self.cache.clone())
    }

    /// Research `topic` and write a cited report.
    pub async fn run_research(&self, topic: &str) -> AppResult<ResearchReport> {
        let span = tracing::info_span!("research", topic = %topic);
        self.research(topic).instrument(span).await
    }

    async fn research(&self, topic: &str) -> AppResult<ResearchReport> {
        self.config.validate()?;
        let budget = IterationBudget::new(self.config.refinement_budget);

        let planner = QueryPlanner::new(
            self.generator.clone(),
            self.prompts.clone(),
            self.config.max_queries_per_cycle,
        );
        let executor = self.executor();
        let outcome = ResearchLoop::new(&planner, &executor, self.config.max_queries_per_cycle)
            .run(topic, &budget)
            .await?;

        if outcome.results.is_empty() {
            tracing::warn!("Nothing found, returning an empty report");
            return Ok(ResearchReport {
                queries: outcome.queries_used,
                refinement_cycles: outcome.refinement_cycles,
                ..ResearchReport::no_information(topic)
            });
        }

        let filter = SourceFilter::new(
            self.generator.clone(),
            self.prompts.clone(),
            self.config.max_sources,
        );
        let mut sources = filter.filter(topic, &outcome.results).await?.results;
        if sources.is_empty() {
            tracing::warn!("Filter kept no sources, using the first results instead");
            sources = outcome
                .results
                .iter()
                .take(self.config.max_sources)
                .cloned()
                .collect();
        }

        let synthesizer = AnswerSynthesizer::new(self.generator.clone(), self.prompts.clone());
        let report = synthesizer.synthesize(topic, &sources).await?;
        let (report, feedback_rounds) = self
            .revise_on_feedback(topic, report, &sources, &synthesizer, &budget)
            .await?;

        tracing::info!(
            sources = sources.len(),
            cycles = outcome.refinement_cycles,
            feedback_rounds,
            "Research finished"
        );

        Ok(ResearchReport {
            topic: topic.to_string(),
            report,
            sources: SourceRef::enumerate(&sources),
            queries: outcome.queries_used,
            refinement_cycles: outcome.refinement_cycles,
            feedback_rounds,
        })
    }

    /// Re-synthesize while the reader asks for changes and budget remains.
    async fn revise_on_feedback(
        &self,
        topic: &str,
        mut report: String,
        sources: &ResultSet,
        synthesizer: &AnswerSynthesizer,
        budget: &IterationBudget,
    ) -> AppResult<(String, u32)> {
        let Some(source) = self.feedback.as_deref().filter(|_| self.config.interactive) else {
            return Ok((report, 0));
        };
        let timeout = Duration::from_secs_f64(self.config.user_timeout_seconds);

        let mut rounds = 0;
        while !budget.is_exhausted() {
            let Some(feedback) = collect_feedback(source, &report, timeout).await? else {
                break;
            };
            if !budget.try_spend() {
                break;
            }

            rounds += 1;
            tracing::info!(round = rounds, "Revising report on feedback");
            let reframed = reframe_topic(topic, &report, &feedback);
            report = synthesizer.synthesize(&reframed, sources).await?;
        }

        Ok((report, rounds))
    }
}

/// Cache at `cache_directory`, or `.delve/cache` under the current directory,
/// unless caching is off.
fn configured_cache(config: &ResearchConfig) -> SearchCache {
    if !config.use_cache {
        return SearchCache::disabled();
    }
    match config.cache_directory {
        Some(ref dir) => SearchCache::new(dir),
        None => SearchCache::new(Path::new(STATE_DIR).join("cache")),
    }
}
