//! TOML-based configuration for A.R.E.S Deep Research
//!
//! This module provides declarative configuration for providers, models, the
//! search backend, and research limits via a TOML file (`research.toml`).
//!
//! Secrets never live in the file: providers and search backends name the
//! environment variable that holds their key, resolved at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named LLM provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model configurations that reference providers
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,

    /// Web search backend
    #[serde(default)]
    pub search: SearchConfig,

    /// Supervisor/researcher limits and model roles
    #[serde(default)]
    pub research: ResearchSettings,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        default_model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        default_model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Model name/identifier to use with the provider
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default reply ceiling; individual calls may ask for less
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.0
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// DuckDuckGo through daedra, no key needed
    #[default]
    DuckDuckGo,
    /// Tavily search API
    Tavily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub backend: SearchBackend,

    /// Environment variable holding the backend API key (tavily)
    pub api_key_env: Option<String>,

    /// Override for the backend endpoint
    pub base_url: Option<String>,

    /// Maximum results requested per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default)]
    pub topic: crate::search::SearchTopic,
}

fn default_max_results() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::default(),
            api_key_env: None,
            base_url: None,
            max_results: default_max_results(),
            topic: Default::default(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSettings {
    /// Parallel research units the supervisor is told it may launch per decision
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_research_units: usize,

    /// Supervisor decision cycles before the phase is forced to end
    #[serde(default = "default_max_researcher_iterations")]
    pub max_researcher_iterations: usize,

    /// Ask a clarifying question before researching when the request is ambiguous
    #[serde(default = "default_true")]
    pub allow_clarification: bool,

    /// Reply ceiling for a researcher's compressed findings
    #[serde(default = "default_compression_max_tokens")]
    pub compression_max_tokens: u32,

    /// Characters of raw page text kept when page summarization fails
    #[serde(default = "default_summarization_max_chars")]
    pub summarization_max_chars: usize,

    #[serde(default = "default_model_name")]
    pub research_model: String,

    #[serde(default = "default_model_name")]
    pub summarization_model: String,

    #[serde(default = "default_model_name")]
    pub compression_model: String,

    #[serde(default = "default_model_name")]
    pub final_report_model: String,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_max_researcher_iterations() -> usize {
    6
}

fn default_true() -> bool {
    true
}

fn default_compression_max_tokens() -> u32 {
    8192
}

fn default_summarization_max_chars() -> usize {
    1000
}

fn default_model_name() -> String {
    "default".to_string()
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_concurrent_research_units: default_max_concurrent(),
            max_researcher_iterations: default_max_researcher_iterations(),
            allow_clarification: true,
            compression_max_tokens: default_compression_max_tokens(),
            summarization_max_chars: default_summarization_max_chars(),
            research_model: default_model_name(),
            summarization_model: default_model_name(),
            compression_model: default_model_name(),
            final_report_model: default_model_name(),
        }
    }
}

impl ResearchSettings {
    /// The four model roles as (role, model name) pairs
    pub fn model_roles(&self) -> [(&'static str, &str); 4] {
        [
            ("research_model", self.research_model.as_str()),
            ("summarization_model", self.summarization_model.as_str()),
            ("compression_model", self.compression_model.as_str()),
            ("final_report_model", self.final_report_model.as_str()),
        ]
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' referenced by {1} does not exist")]
    MissingModel(String, String),
}

impl ResearchConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse without validating (env vars are not consulted)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        for provider in self.providers.values() {
            if let ProviderConfig::OpenAI { api_key_env, .. } = provider {
                self.validate_env_var(api_key_env)?;
            }
        }

        // Validate model -> provider references
        for (model_name, model_config) in &self.models {
            if self.get_provider(&model_config.provider).is_none() {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
        }

        // Validate research role -> model references
        for (role, model) in self.research.model_roles() {
            if self.get_model(model).is_none() {
                return Err(ConfigError::MissingModel(
                    model.to_string(),
                    format!("research.{}", role),
                ));
            }
        }

        if self.search.backend == SearchBackend::Tavily {
            let env = self.search.api_key_env.as_deref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "search.api_key_env is required for the tavily backend".to_string(),
                )
            })?;
            self.validate_env_var(env)?;
        }

        self.validate_limits()
    }

    /// Numeric limits only; does not touch the environment
    pub fn validate_limits(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.research.max_researcher_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_researcher_iterations must be at least 1".to_string(),
            ));
        }
        if self.research.max_concurrent_research_units == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_concurrent_research_units must be at least 1".to_string(),
            ));
        }

        let compression = &self.research.compression_model;
        if let Some(model_limit) = self.get_model(compression).and_then(|m| m.max_tokens) {
            if self.research.compression_max_tokens > model_limit {
                return Err(ConfigError::ValidationError(format!(
                    "research.compression_max_tokens ({}) exceeds max_tokens ({}) of compression model '{}'",
                    self.research.compression_max_tokens, model_limit, compression
                )));
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get model by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }
}
