//! Fake collaborators.

use delve_core::{AppError, AppResult};
use delve_llm::{Generator, Schema};
use delve_search::{RawDocument, SearchProvider};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::feedback::FeedbackSource;

type TextFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Replays structured responses in call order. Free text defaults to
/// echoing the user prompt, so reports contain whatever sources they saw.
pub struct FakeGenerator {
    structured: Mutex<VecDeque<Value>>,
    fallback: Option<Value>,
    text: TextFn,
    structured_prompts: Mutex<Vec<String>>,
    text_prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(structured: Vec<Value>) -> Self {
        Self {
            structured: Mutex::new(structured.into()),
            fallback: None,
            text: Box::new(|user| user.to_string()),
            structured_prompts: Mutex::new(Vec::new()),
            text_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Response used once the script runs out.
    pub fn with_fallback(mut self, value: Value) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn with_text(mut self, text: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.text = Box::new(text);
        self
    }

    pub fn structured_prompts(&self) -> Vec<String> {
        self.structured_prompts.lock().unwrap().clone()
    }

    pub fn text_prompts(&self) -> Vec<String> {
        self.text_prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Generator for FakeGenerator {
    async fn generate_text(&self, _system: &str, user: &str) -> AppResult<String> {
        self.text_prompts.lock().unwrap().push(user.to_string());
        Ok((self.text)(user))
    }

    async fn generate_structured(
        &self,
        _system: &str,
        user: &str,
        schema: &Schema,
    ) -> AppResult<Value> {
        self.structured_prompts.lock().unwrap().push(user.to_string());
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| AppError::Llm(format!("no scripted response for '{}'", schema.name)))
    }
}

/// Serves scripted documents per query. Unscripted queries get one
/// document whose URL is derived from the query.
#[derive(Default)]
pub struct FakeProvider {
    responses: HashMap<String, Vec<RawDocument>>,
    failing: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with(mut self, query: &str, docs: Vec<RawDocument>) -> Self {
        self.responses.insert(query.to_string(), docs);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing = Some(query.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<RawDocument>> {
        self.calls.lock().unwrap().push(query.to_string());
        if self.failing.as_deref() == Some(query) {
            return Err(AppError::search(query, "service unavailable"));
        }
        Ok(self.responses.get(query).cloned().unwrap_or_else(|| {
            vec![RawDocument::new(
                format!("About {}", query),
                format!("https://search.test/{}", query.replace(' ', "-")),
                format!("Text about {}", query),
            )]
        }))
    }
}

/// Replies from a script, optionally after a delay. Records what was shown.
pub struct ScriptedFeedback {
    replies: Mutex<VecDeque<Option<String>>>,
    delay: Option<Duration>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedFeedback {
    pub fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            delay: None,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeedbackSource for ScriptedFeedback {
    async fn request_feedback(&self, report: &str) -> AppResult<Option<String>> {
        self.shown.lock().unwrap().push(report.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.replies.lock().unwrap().pop_front().flatten())
    }
}
