//! Configuration management for delve.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - The workspace config file (`.delve/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Workspace state (config, prompt overrides, the search cache) lives in `.delve/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".delve";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .delve/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama" or "openai")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// API key for the search provider
    pub search_api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Web search settings
    pub search: SearchConfig,

    /// Research loop settings
    pub research: ResearchConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Endpoint override, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Web search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Search provider ("searxng" or "exa")
    pub provider: String,

    /// Provider base URL override
    pub endpoint: Option<String>,

    /// Environment variable holding the provider API key
    pub api_key_env: Option<String>,

    /// Maximum documents requested per query
    pub max_results: usize,

    /// HTTP timeout in seconds
    pub timeout: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "searxng".to_string(),
            endpoint: None,
            api_key_env: None,
            max_results: 10,
            timeout: Some(30),
        }
    }
}

/// Research loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchConfig {
    /// Upper bound on queries issued per cycle (planning or refinement)
    pub max_queries_per_cycle: usize,

    /// Upper bound on sources kept by the relevance filter
    pub max_sources: usize,

    /// Refinement cycles allowed after the initial search. Interactive
    /// feedback rounds draw from the same budget.
    pub refinement_budget: u32,

    /// Persist raw search results keyed by query
    pub use_cache: bool,

    /// Cache location (defaults to `.delve/cache` in the workspace)
    pub cache_directory: Option<PathBuf>,

    /// Ask for feedback on the report before returning it
    pub interactive: bool,

    /// How long to wait for feedback before accepting the report
    pub user_timeout_seconds: f64,

    /// Model used for per-document summaries (defaults to the main model)
    pub summary_model: Option<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_queries_per_cycle: 3,
            max_sources: 8,
            refinement_budget: 2,
            use_cache: true,
            cache_directory: None,
            interactive: false,
            user_timeout_seconds: 60.0,
            summary_model: None,
        }
    }
}

impl ResearchConfig {
    /// Check the numeric bounds.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_queries_per_cycle == 0 {
            return Err(AppError::Config(
                "research.maxQueriesPerCycle must be greater than zero".to_string(),
            ));
        }
        if self.max_sources == 0 {
            return Err(AppError::Config(
                "research.maxSources must be greater than zero".to_string(),
            ));
        }
        if !self.user_timeout_seconds.is_finite() || self.user_timeout_seconds < 0.0 {
            return Err(AppError::Config(format!(
                "research.userTimeoutSeconds must be a non-negative number, got {}",
                self.user_timeout_seconds
            )));
        }
        Ok(())
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    search: Option<SearchConfig>,
    research: Option<ResearchConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            search_api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the workspace config file and environment.
    ///
    /// Environment variables:
    /// - `DELVE_WORKSPACE`: Override workspace path
    /// - `DELVE_CONFIG`: Path to config file
    /// - `DELVE_PROVIDER`: LLM provider
    /// - `DELVE_MODEL`: Model identifier
    /// - `DELVE_API_KEY`: LLM API key
    /// - `DELVE_SEARCH_API_KEY`: Search provider API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("DELVE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("DELVE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.state_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DELVE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DELVE_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("DELVE_API_KEY").ok();
        config.search_api_key = std::env::var("DELVE_SEARCH_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(research) = config_file.research {
            result.research = research;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the .delve directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Ensure the .delve directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", STATE_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Directory holding prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.state_dir().join("prompts")
    }

    /// Directory holding cached search results.
    pub fn cache_dir(&self) -> PathBuf {
        self.research
            .cache_directory
            .clone()
            .unwrap_or_else(|| self.state_dir().join("cache"))
    }

    /// Model used for per-document summaries.
    pub fn summary_model(&self) -> &str {
        self.research.summary_model.as_deref().unwrap_or(&self.model)
    }

    /// Get the configuration for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint configured for a provider, if any.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Resolve the LLM API key.
    ///
    /// `DELVE_API_KEY` wins over the provider's `apiKeyEnv` variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Resolve the search provider API key.
    pub fn resolve_search_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.search_api_key {
            return Some(key.clone());
        }

        self.search
            .api_key_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var).ok())
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_search = ["searxng", "exa"];
        if !known_search.contains(&self.search.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                known_search.join(", ")
            )));
        }

        if self.provider == "openai" && self.resolve_api_key("openai").is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (DELVE_API_KEY or apiKeyEnv)".to_string(),
            ));
        }

        if self.search.provider == "exa" && self.resolve_search_api_key().is_none() {
            return Err(AppError::Config(
                "Exa search requires an API key (DELVE_SEARCH_API_KEY or search.apiKeyEnv)"
                    .to_string(),
            ));
        }

        self.research.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.search.provider, "searxng");
        assert_eq!(config.research.refinement_budget, 2);
        assert!(config.research.use_cache);
        assert!(!config.research.interactive);
    }

    #[test]
    fn test_cache_dir_defaults_to_state_dir() {
        let config = AppConfig::default();
        assert!(config.cache_dir().ends_with(".delve/cache"));

        let mut config = AppConfig::default();
        config.research.cache_directory = Some(PathBuf::from("/tmp/delve-cache"));
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/delve-cache"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let yaml = r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: qwen2.5
search:
  provider: searxng
  endpoint: http://localhost:8888
  maxResults: 5
research:
  maxQueriesPerCycle: 4
  refinementBudget: 0
  useCache: false
logging:
  level: warn
  color: false
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(merged.model, "qwen2.5");
        assert_eq!(
            merged.provider_endpoint("ollama").as_deref(),
            Some("http://gpu-box:11434")
        );
        assert_eq!(merged.search.max_results, 5);
        assert_eq!(merged.research.max_queries_per_cycle, 4);
        assert_eq!(merged.research.refinement_budget, 0);
        assert!(!merged.research.use_cache);
        // Unset keys keep their defaults
        assert_eq!(merged.research.max_sources, 8);
        assert_eq!(merged.log_level.as_deref(), Some("warn"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_openai_provider_config_parses() {
        let yaml = r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: OPENAI_API_KEY
      model: gpt-4o-mini
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();
        assert!(matches!(
            merged.get_provider_config("openai"),
            Some(ProviderConfig::OpenAI { .. })
        ));
        assert_eq!(merged.model, "gpt-4o-mini");
    }

    #[test]
    fn test_summary_model_fallback() {
        let mut config = AppConfig::default();
        assert_eq!(config.summary_model(), "llama3.2");
        config.research.summary_model = Some("llama3.2:1b".to_string());
        assert_eq!(config.summary_model(), "llama3.2:1b");
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_bounds() {
        let mut config = AppConfig::default();
        config.research.max_sources = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.research.max_queries_per_cycle = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }
}
