//! Research command handler.
//!
//! Runs the full plan, search, filter and report pipeline for a topic.

use super::{build_generator, build_provider, prompt_library};
use clap::Args;
use delve_core::{config::AppConfig, AppError, AppResult};
use delve_research::{ResearchReport, Researcher, StdinFeedback};
use std::path::PathBuf;
use std::sync::Arc;

/// Research a topic and print a cited report
#[derive(Args, Debug)]
pub struct ResearchCommand {
    /// Topic to research
    #[arg(required = true)]
    pub topic: Vec<String>,

    /// Maximum queries per search cycle
    #[arg(long)]
    pub max_queries: Option<usize>,

    /// Maximum sources kept for the report
    #[arg(long)]
    pub max_sources: Option<usize>,

    /// Refinement cycles (and feedback rounds) allowed
    #[arg(long)]
    pub budget: Option<u32>,

    /// Do not read or write the search cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache directory (default: .delve/cache)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Ask for feedback on the report and revise it
    #[arg(short, long)]
    pub interactive: bool,

    /// Seconds to wait for feedback before accepting the report
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing research command");
        tracing::debug!("Research options: {:?}", self);
        config.validate()?;

        let topic = self.topic.join(" ");
        if topic.trim().is_empty() {
            return Err(AppError::Config("No research topic provided".to_string()));
        }

        let mut settings = config.research.clone();
        if let Some(max_queries) = self.max_queries {
            settings.max_queries_per_cycle = max_queries;
        }
        if let Some(max_sources) = self.max_sources {
            settings.max_sources = max_sources;
        }
        if let Some(budget) = self.budget {
            settings.refinement_budget = budget;
        }
        if let Some(timeout) = self.timeout {
            settings.user_timeout_seconds = timeout;
        }
        if self.no_cache {
            settings.use_cache = false;
        }
        settings.cache_directory = Some(self.cache_dir.clone().unwrap_or_else(|| config.cache_dir()));
        if self.interactive {
            settings.interactive = true;
        }
        settings.validate()?;

        let generator = build_generator(config, &config.model)?;
        let summarizer = build_generator(config, config.summary_model())?;
        let provider = build_provider(config)?;
        let interactive = settings.interactive;

        let mut researcher = Researcher::new(generator, provider, settings)
            .with_summarizer(summarizer)
            .with_prompts(prompt_library(config));
        if interactive {
            researcher = researcher.with_feedback(Arc::new(StdinFeedback::new()));
        }

        let report = researcher.run_research(&topic).await?;
        self.print(&report)
    }

    fn print(&self, report: &ResearchReport) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        println!("{}", report.report);
        if report.has_sources() {
            println!();
            println!("Sources:");
            for source in &report.sources {
                println!("  [{}] {} - {}", source.index, source.title, source.url);
            }
        }
        Ok(())
    }
}
