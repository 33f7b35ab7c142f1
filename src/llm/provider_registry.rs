//! Provider Registry for managing multiple LLM providers
//!
//! This module provides a registry for managing named LLM providers and models
//! configured via `research.toml`. The research pipeline asks for one client per
//! model role (research, summarization, compression, final report); see
//! [`ProviderRegistry::role_clients`].

use crate::llm::client::{LLMClient, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ModelConfig, ProviderConfig, ResearchConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing multiple named LLM providers
///
/// The ProviderRegistry holds provider and model configurations and creates
/// LLM clients for specific models by name.
pub struct ProviderRegistry {
    /// Provider configurations keyed by name
    providers: HashMap<String, ProviderConfig>,
    /// Model configurations keyed by name
    models: HashMap<String, ModelConfig>,
}

/// One client per model role used by a research session
#[derive(Clone)]
pub struct RoleClients {
    pub research: Arc<dyn LLMClient>,
    pub summarization: Arc<dyn LLMClient>,
    pub compression: Arc<dyn LLMClient>,
    pub final_report: Arc<dyn LLMClient>,
}

impl ProviderRegistry {
    /// Create a new empty provider registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            models: HashMap::new(),
        }
    }

    /// Create a provider registry from TOML configuration
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self {
            providers: config.providers.clone(),
            models: config.models.clone(),
        }
    }

    /// Register a provider configuration
    pub fn register_provider(&mut self, name: &str, config: ProviderConfig) {
        self.providers.insert(name.to_string(), config);
    }

    /// Register a model configuration
    pub fn register_model(&mut self, name: &str, config: ModelConfig) {
        self.models.insert(name.to_string(), config);
    }

    /// Get a provider configuration by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get a model configuration by name
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Get all model names, sorted
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the model -> provider chain without building a client
    pub fn resolve_provider(&self, model_name: &str) -> Result<Provider> {
        let model_config = self.get_model(model_name).ok_or_else(|| {
            AppError::Configuration(format!(
                "Model '{}' not found in configuration (known: {})",
                model_name,
                self.model_names().join(", ")
            ))
        })?;

        let provider_config = self.get_provider(&model_config.provider).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' not found",
                model_config.provider, model_name
            ))
        })?;

        Provider::from_model_config(model_config, provider_config)
    }

    /// Create an LLM client for a specific model by name
    pub fn create_client_for_model(&self, model_name: &str) -> Result<Arc<dyn LLMClient>> {
        let provider = self.resolve_provider(model_name)?;
        tracing::debug!(
            model = model_name,
            provider = provider.name(),
            model_id = provider.model(),
            "Creating LLM client"
        );
        Ok(Arc::from(provider.create_client()?))
    }

    /// Create the four role clients named in the `[research]` section
    pub fn role_clients(&self, config: &ResearchConfig) -> Result<RoleClients> {
        let research = &config.research;
        Ok(RoleClients {
            research: self.create_client_for_model(&research.research_model)?,
            summarization: self.create_client_for_model(&research.summarization_model)?,
            compression: self.create_client_for_model(&research.compression_model)?,
            final_report: self.create_client_for_model(&research.final_report_model)?,
        })
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
