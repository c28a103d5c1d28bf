//! Final report synthesis.

use delve_core::AppResult;
use delve_llm::Generator;
use delve_prompt::{defaults, PromptLibrary};
use delve_search::ResultSet;
use std::sync::Arc;

/// Enumerate documents as citable blocks:
///
/// ```text
/// [1] Title
/// Link: https://...
/// Content: ...
/// ```
pub fn format_sources(results: &ResultSet) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "[{}] {}\nLink: {}\nContent: {}",
                i + 1,
                doc.title,
                doc.url,
                doc.content().trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Writes the cited report from filtered sources.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    prompts: PromptLibrary,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>, prompts: PromptLibrary) -> Self {
        Self { generator, prompts }
    }

    /// Report on `topic` citing `sources` as `[n]`.
    pub async fn synthesize(&self, topic: &str, sources: &ResultSet) -> AppResult<String> {
        let formatted = format_sources(sources);
        let prompt = self.prompts.render(
            defaults::REPORT,
            [("topic", topic), ("sources", formatted.as_str())],
        )?;

        let report = self.generator.generate_text(&prompt.system, &prompt.user).await?;
        tracing::debug!(chars = report.len(), sources = sources.len(), "Synthesized report");
        Ok(report.trim().to_string())
    }
}
