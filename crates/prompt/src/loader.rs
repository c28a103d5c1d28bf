//! Prompt loader for YAML prompt definitions.
//!
//! A prompt is looked up in the workspace overrides directory first
//! (`<dir>/<id>.yml`) and falls back to the built-in definition.

use crate::defaults;
use crate::types::{PromptDefinition, PromptOrigin};
use delve_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Load a prompt definition by ID.
///
/// # Arguments
/// * `overrides_dir` - Directory holding `<id>.yml` overrides, if any
/// * `prompt_id` - Prompt identifier (e.g., "research.plan")
///
/// # Example
/// ```no_run
/// use delve_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Some(Path::new(".delve/prompts")), "research.plan")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(overrides_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = overrides_dir {
        let prompt_file = dir.join(format!("{}.yml", prompt_id));
        if prompt_file.exists() {
            tracing::debug!("Loading prompt override from: {:?}", prompt_file);

            let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to read prompt file {:?}: {}",
                    prompt_file, e
                ))
            })?;

            let definition = parse_definition(&contents, &format!("{:?}", prompt_file))?;
            if definition.id != prompt_id {
                return Err(AppError::Prompt(format!(
                    "Prompt file {:?} declares id '{}', expected '{}'",
                    prompt_file, definition.id, prompt_id
                )));
            }
            return Ok(definition);
        }
    }

    let source = defaults::builtin_source(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;
    parse_definition(source, "built-in")
}

/// List every available prompt ID with where it resolves from.
pub fn list_prompts(overrides_dir: Option<&Path>) -> AppResult<Vec<(String, PromptOrigin)>> {
    let mut prompts: BTreeMap<String, PromptOrigin> = defaults::BUILTIN_IDS
        .iter()
        .map(|id| (id.to_string(), PromptOrigin::Builtin))
        .collect();

    if let Some(dir) = overrides_dir.filter(|dir| dir.exists()) {
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompts.insert(stem.to_string(), PromptOrigin::Workspace);
                }
            }
        }
    }

    Ok(prompts.into_iter().collect())
}

fn parse_definition(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
