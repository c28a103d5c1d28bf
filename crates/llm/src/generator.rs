//! Text and structured generation on top of an [`LlmClient`].
//!
//! The research pipeline only needs two capabilities from a model: free text
//! and a JSON value matching a small fixed schema. [`Generator`] is that seam.
//! [`LlmGenerator`] implements structured output as two calls: an unconstrained
//! answer, then an extraction pass in JSON mode that turns the answer into the
//! schema. Only the extracted value is returned.

use crate::client::{LlmClient, LlmRequest};
use delve_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Shape the model output must be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Short identifier used in logs and errors
    pub name: &'static str,

    /// What the fields mean, in plain words
    pub description: &'static str,

    /// A literal JSON example of the expected object
    pub example: &'static str,
}

/// Model capability used by the research pipeline.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Free-form generation.
    async fn generate_text(&self, system: &str, user: &str) -> AppResult<String>;

    /// Generation coerced into a JSON object matching `schema`.
    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &Schema,
    ) -> AppResult<serde_json::Value>;
}

/// Run a structured generation and deserialize the result into `T`.
///
/// A value that does not match `T` is a [`AppError::StructuredParse`].
pub async fn generate_typed<T: DeserializeOwned>(
    generator: &dyn Generator,
    system: &str,
    user: &str,
    schema: &Schema,
) -> AppResult<T> {
    let value = generator.generate_structured(system, user, schema).await?;
    serde_json::from_value(value).map_err(|e| {
        AppError::StructuredParse(format!(
            "Response does not match schema '{}': {}",
            schema.name, e
        ))
    })
}

/// [`Generator`] backed by an LLM client.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmGenerator {
    /// Create a generator for `model` on `client`.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sampling temperature for free-form calls.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Token limit for free-form calls.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Model this generator talks to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl Generator for LlmGenerator {
    async fn generate_text(&self, system: &str, user: &str) -> AppResult<String> {
        let mut request = LlmRequest::new(user, &self.model).with_system(system);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.client.complete(&request).await?;
        tracing::debug!(
            provider = self.client.provider_name(),
            total_tokens = response.usage.total_tokens,
            "Text generation finished"
        );
        Ok(response.content)
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &Schema,
    ) -> AppResult<serde_json::Value> {
        let draft = self.generate_text(system, user).await?;
        tracing::debug!(schema = schema.name, draft = %draft, "Extracting structured output");

        let request = LlmRequest::new(extraction_prompt(schema, &draft), &self.model)
            .with_system(EXTRACTION_SYSTEM)
            .with_temperature(0.0)
            .with_json_mode();

        let response = self.client.complete(&request).await?;
        parse_json_object(&response.content).map_err(|e| {
            AppError::StructuredParse(format!("schema '{}': {}", schema.name, e))
        })
    }
}

const EXTRACTION_SYSTEM: &str = "You convert text into JSON. Reply with a single JSON object and nothing else.";

fn extraction_prompt(schema: &Schema, draft: &str) -> String {
    format!(
        "Extract the following information from the text below.\n\n\
         {}\n\n\
         Respond with a JSON object shaped exactly like this example:\n{}\n\n\
         Text:\n{}",
        schema.description, schema.example, draft
    )
}

/// Parse a JSON object out of model output.
///
/// Accepts bare JSON, fenced code blocks and objects surrounded by prose.
fn parse_json_object(raw: &str) -> Result<serde_json::Value, String> {
    let trimmed = strip_code_fence(raw.trim());

    let value = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value,
        Err(first_err) => {
            let (start, end) = match (trimmed.find('{'), trimmed.rfind('}')) {
                (Some(start), Some(end)) if start < end => (start, end),
                _ => return Err(format!("no JSON object in model output: {}", first_err)),
            };
            serde_json::from_str(&trimmed[start..=end])
                .map_err(|e| format!("invalid JSON in model output: {}", e))?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(format!("expected a JSON object, got {}", value))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmResponse, LlmUsage};
    use serde::Deserialize;
    use std::sync::Mutex;

    const QUERIES: Schema = Schema {
        name: "queries",
        description: "The search queries mentioned in the text.",
        example: r#"{"queries": ["first query", "second query"]}"#,
    };

    /// Client that replays canned responses and records requests.
    struct ReplayClient {
        responses: Mutex<Vec<String>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl ReplayClient {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ReplayClient {
        fn provider_name(&self) -> &str {
            "replay"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AppError::Llm("no more responses".to_string()))?;
            Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    #[derive(Debug, Deserialize)]
    struct QueryList {
        queries: Vec<String>,
    }

    #[test]
    fn test_parse_bare_object() {
        let value = parse_json_object(r#"{"queries": ["a"]}"#).unwrap();
        assert_eq!(value["queries"][0], "a");
    }

    #[test]
    fn test_parse_fenced_object() {
        let raw = "```json\n{\"sources\": [2, 1]}\n```";
        let value = parse_json_object(raw).unwrap();
        assert_eq!(value["sources"][1], 1);
    }

    #[test]
    fn test_parse_object_inside_prose() {
        let raw = "Sure! Here it is: {\"queries\": []} Hope that helps.";
        let value = parse_json_object(raw).unwrap();
        assert!(value["queries"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_json_object("[1, 2, 3]").is_err());
        assert!(parse_json_object("no json here").is_err());
    }

    #[tokio::test]
    async fn test_structured_generation_is_two_calls() {
        let client = Arc::new(ReplayClient::new(&[
            "I would search for rust async and tokio internals.",
            r#"{"queries": ["rust async", "tokio internals"]}"#,
        ]));
        let generator = LlmGenerator::new(client.clone(), "test-model");

        let list: QueryList = generate_typed(&generator, "plan", "topic: rust", &QUERIES)
            .await
            .unwrap();
        assert_eq!(list.queries, vec!["rust async", "tokio internals"]);

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].json_mode);
        assert!(requests[1].json_mode);
        assert!(requests[1].prompt.contains("tokio internals"));
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_structured_parse_error() {
        let client = Arc::new(ReplayClient::new(&["draft", r#"{"queries": "not a list"}"#]));
        let generator = LlmGenerator::new(client, "test-model");

        let result: AppResult<QueryList> =
            generate_typed(&generator, "plan", "topic", &QUERIES).await;
        assert!(matches!(result, Err(AppError::StructuredParse(_))));
    }

    #[tokio::test]
    async fn test_unparsable_extraction_is_structured_parse_error() {
        let client = Arc::new(ReplayClient::new(&["draft", "I cannot do that."]));
        let generator = LlmGenerator::new(client, "test-model");

        let result = generator.generate_structured("plan", "topic", &QUERIES).await;
        assert!(matches!(result, Err(AppError::StructuredParse(_))));
    }
}
