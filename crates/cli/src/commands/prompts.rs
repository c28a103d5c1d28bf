//! Prompts command handler.

use clap::Args;
use delve_core::{config::AppConfig, AppResult};
use delve_prompt::{list_prompts, load_prompt, PromptOrigin};

/// List prompts or print one prompt's definition as YAML
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Prompt to print (e.g. research.plan)
    pub id: Option<String>,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let overrides = config.prompts_dir();
        let overrides = overrides.is_dir().then_some(overrides.as_path());

        if let Some(ref id) = self.id {
            // Same format as an override file, ready to copy into .delve/prompts/
            let definition = load_prompt(overrides, id)?;
            print!("{}", serde_yaml::to_string(&definition)?);
            return Ok(());
        }

        for (id, origin) in list_prompts(overrides)? {
            let origin = match origin {
                PromptOrigin::Builtin => "built-in",
                PromptOrigin::Workspace => "workspace",
            };
            println!("{:<24} {}", id, origin);
        }
        Ok(())
    }
}

