//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use delve_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Both the system and user templates are rendered with Handlebars, without
/// HTML escaping.
///
/// # Example
/// ```no_run
/// use delve_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, "research.plan")?;
/// let mut vars = HashMap::new();
/// vars.insert("topic".to_string(), "Rust async runtimes".to_string());
/// vars.insert("max_queries".to_string(), "3".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = render_template(&definition.system, &variables)?;
    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system.trim().to_string(),
        user.trim().to_string(),
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
