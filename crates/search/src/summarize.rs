//! Per-document summarization.

use crate::types::{truncate_chars, Document};
use delve_llm::Generator;
use delve_prompt::{defaults, PromptLibrary};
use std::sync::Arc;

/// Characters of page text handed to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 12_000;

/// Characters of raw text kept when summarization fails.
pub const DEFAULT_FALLBACK_CHARS: usize = 2_000;

/// Condenses fetched pages with a model. Never fails: on any model error
/// the summary falls back to the start of the raw text.
pub struct DocumentSummarizer {
    generator: Arc<dyn Generator>,
    prompts: PromptLibrary,
    max_input_chars: usize,
    fallback_chars: usize,
}

impl DocumentSummarizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: PromptLibrary::builtin(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            fallback_chars: DEFAULT_FALLBACK_CHARS,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_limits(mut self, max_input_chars: usize, fallback_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self.fallback_chars = fallback_chars;
        self
    }

    /// Summary of `document` in the context of `query`.
    pub async fn summarize(&self, query: &str, document: &Document) -> String {
        match self.try_summarize(query, document).await {
            Ok(summary) if !summary.is_empty() => summary,
            Ok(_) => {
                tracing::warn!(url = %document.url, "Model returned an empty summary, using raw text");
                truncate_chars(&document.raw_text, self.fallback_chars)
            }
            Err(e) => {
                tracing::warn!(url = %document.url, "Summarization failed, using raw text: {}", e);
                truncate_chars(&document.raw_text, self.fallback_chars)
            }
        }
    }

    async fn try_summarize(&self, query: &str, document: &Document) -> delve_core::AppResult<String> {
        let text = truncate_chars(&document.raw_text, self.max_input_chars);
        let prompt = self.prompts.render(
            defaults::SUMMARIZE,
            [
                ("query", query),
                ("title", document.title.as_str()),
                ("text", text.as_str()),
            ],
        )?;

        let summary = self.generator.generate_text(&prompt.system, &prompt.user).await?;
        Ok(summary.trim().to_string())
    }
}
