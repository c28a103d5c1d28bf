//! Search command handler.
//!
//! Runs one batch of queries through the search pipeline without planning
//! or synthesis. Useful for checking a provider and warming the cache.

use super::{build_generator, build_provider, prompt_library, search_cache};
use clap::Args;
use delve_core::{config::AppConfig, AppResult};
use delve_search::{DocumentSummarizer, SearchExecutor};

/// Run search queries and print the summarized results
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Queries to run concurrently
    #[arg(required = true)]
    pub queries: Vec<String>,

    /// Do not read or write the search cache
    #[arg(long)]
    pub no_cache: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");
        config.validate()?;

        let generator = build_generator(config, config.summary_model())?;
        let summarizer = DocumentSummarizer::new(generator).with_prompts(prompt_library(config));
        let cache = search_cache(config, config.research.use_cache && !self.no_cache, None);
        let executor = SearchExecutor::new(build_provider(config)?, summarizer).with_cache(cache);

        let results = executor.execute(&self.queries).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No results.");
            return Ok(());
        }

        for (i, doc) in results.iter().enumerate() {
            println!("[{}] {}", i + 1, doc.title);
            println!("    {}", doc.url);
            if let Some(ref summary) = doc.summary {
                for line in summary.lines() {
                    println!("    {}", line);
                }
            }
            println!();
        }
        Ok(())
    }
}
