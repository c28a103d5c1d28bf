//! Prompt system for delve.
//!
//! Structured prompt management with:
//! - YAML prompt definitions (built-in, overridable per workspace)
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod library;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use library::PromptLibrary;
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOrigin};
