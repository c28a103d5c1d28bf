//! Cache command handler.

use super::search_cache;
use clap::{Args, Subcommand};
use delve_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Inspect or clear the search cache
#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub action: CacheAction,

    /// Cache directory (default: .delve/cache)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show entry count and size
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every cached entry
    Clear,
}

impl CacheCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let cache = search_cache(config, true, self.cache_dir.as_deref());
        let location = cache
            .directory()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();

        match self.action {
            CacheAction::Stats { json } => {
                let stats = cache.stats().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    println!("Cache: {}", location);
                    println!("  Entries: {}", stats.entries);
                    println!("  Size:    {} bytes", stats.bytes);
                    if stats.locked > 0 {
                        println!("  Locked:  {} (write in progress or abandoned)", stats.locked);
                    }
                }
            }
            CacheAction::Clear => {
                let removed = cache.clear().await?;
                println!("Removed {} cached entries from {}", removed, location);
            }
        }
        Ok(())
    }
}
