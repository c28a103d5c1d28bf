//! Error types for delve.
//!
//! A single error enum covers every failure category in the workspace:
//! configuration, I/O, model calls, search providers, structured extraction,
//! the search cache, prompts and the research pipeline itself.

use thiserror::Error;

/// Unified error type for delve.
///
/// All fallible functions return `Result<T, AppError>`. Recoverable faults
/// (a failed summary, a corrupt cache entry) are absorbed where they occur;
/// everything that reaches the caller of a research run is fatal to it.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// A search provider call failed for one query
    #[error("Search failed for query \"{query}\": {message}")]
    Search { query: String, message: String },

    /// Model output did not match the requested schema
    #[error("Structured output error: {0}")]
    StructuredParse(String),

    /// Search cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Research pipeline errors
    #[error("Research error: {0}")]
    Research(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a search error for `query`.
    pub fn search(query: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Search {
            query: query.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_names_query() {
        let err = AppError::search("rust async", "connection refused");
        let message = err.to_string();
        assert!(message.contains("\"rust async\""));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
