//! Prompt lookup bound to an optional overrides directory.

use crate::builder::build_prompt;
use crate::loader::load_prompt;
use crate::types::BuiltPrompt;
use delve_core::AppResult;
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves and renders prompts by ID.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    overrides_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Library that only knows the built-in prompts.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Library that prefers `<dir>/<id>.yml` over the built-ins.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides_dir: Some(dir.into()),
        }
    }

    /// Load and render prompt `id` with `variables`.
    pub fn render<K, V>(&self, id: &str, variables: impl IntoIterator<Item = (K, V)>) -> AppResult<BuiltPrompt>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let definition = load_prompt(self.overrides_dir.as_deref(), id)?;
        let variables: HashMap<String, String> = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        build_prompt(&definition, variables)
    }
}
