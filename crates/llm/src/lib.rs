//! LLM integration crate for delve.
//!
//! Provider-agnostic access to language models through the [`LlmClient`]
//! trait, plus the [`Generator`] capability the research pipeline consumes.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI**: Any OpenAI-compatible chat completions endpoint
//!
//! # Example
//! ```no_run
//! use delve_llm::{Generator, LlmGenerator, providers::OllamaClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = LlmGenerator::new(Arc::new(OllamaClient::new()), "llama3.2");
//! let text = generator.generate_text("You are terse.", "Hello, world!").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod generator;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use generator::{generate_typed, Generator, LlmGenerator, Schema};
pub use providers::{OllamaClient, OpenAiClient};
