//! delve CLI
//!
//! Main entry point for the delve command-line tool: iterative web research
//! that ends in a cited report.

mod commands;

use clap::{Parser, Subcommand};
use commands::{CacheCommand, PromptsCommand, ResearchCommand, SearchCommand};
use delve_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// delve - iterative web research with cited reports
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Iterative web research with cited reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DELVE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DELVE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "DELVE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DELVE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Research a topic and write a cited report
    Research(ResearchCommand),

    /// Run search queries without planning or synthesis
    Search(SearchCommand),

    /// Inspect or clear the search cache
    Cache(CacheCommand),

    /// List or show prompt definitions
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("delve starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure .delve directory exists
    config.ensure_state_dir()?;

    let command_name = match &cli.command {
        Commands::Research(_) => "research",
        Commands::Search(_) => "search",
        Commands::Cache(_) => "cache",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Research(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Cache(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
