//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for interacting with language model providers:
//! - **OpenAI**: Any OpenAI-compatible chat completions endpoint, including tool calling
//!   and JSON-schema constrained output
//! - **Ollama**: Local inference through the Ollama `/api/chat` endpoint, including tool
//!   calling and schema-constrained output

use crate::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use crate::utils::toml_config::{ModelConfig, ProviderConfig};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing the research loops to run
/// against any backend (or a scripted fake in tests) without code changes.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a single prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_history(&[Message::human(prompt)], None)
            .await
    }

    /// Generate free text from a conversation history
    ///
    /// `max_tokens` caps the length of the reply when the caller needs a
    /// condensed answer; `None` uses the model's configured default.
    async fn generate_with_history(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String>;

    /// Generate with tool calling support over a conversation history
    async fn generate_with_tools_and_history(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Generate a JSON value constrained to the given schema
    async fn generate_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone, PartialEq)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    /// Convert into the model turn that gets appended to a history
    pub fn into_message(self) -> Message {
        Message::ai(self.content, self.tool_calls)
    }
}

/// A named JSON schema describing a fixed output shape
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derive the schema for `T`
    pub fn of<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name: T::schema_name().to_string(),
            schema: serde_json::to_value(&schema).unwrap_or_else(|_| serde_json::json!({})),
        }
    }
}

/// Ask the model for a value of type `T` and decode it.
///
/// The schema is derived from `T`, so the declared output shape and the
/// decoding target cannot drift apart.
pub async fn generate_typed<T>(client: &dyn LLMClient, messages: &[Message]) -> Result<T>
where
    T: JsonSchema + DeserializeOwned,
{
    let schema = OutputSchema::of::<T>();
    let value = client.generate_structured(messages, &schema).await?;
    serde_json::from_value(value).map_err(|e| {
        AppError::LLM(format!(
            "Structured output did not match schema '{}': {}",
            schema.name, e
        ))
    })
}

/// Sampling parameters shared by every provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Provider enum for runtime selection
///
/// | Provider | Tool Calling | Structured Output | Notes |
/// |----------|--------------|-------------------|-------|
/// | OpenAI | ✅ | ✅ json_schema | Any OpenAI-compatible endpoint |
/// | Ollama | ✅ | ✅ format | Recommended for local |
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI, OpenRouter and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     params: ModelParams::default(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    },

    /// Ollama local LLM provider
    ///
    /// Tool calling requires a model that supports it (e.g. `llama3.1`, `qwen2.5`).
    Ollama {
        base_url: String,
        model: String,
        params: ModelParams,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's cargo feature was disabled at build time.
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                params,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                params.clone(),
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                params,
            } => Ok(Box::new(super::ollama::OllamaClient::new(
                base_url.clone(),
                model.clone(),
                params.clone(),
            ))),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} provider support was not compiled in. Rebuild with --features {}",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Resolve a configured model and its provider into a concrete provider
    ///
    /// API keys are read from the environment variable the provider names.
    pub fn from_model_config(
        model_config: &ModelConfig,
        provider_config: &ProviderConfig,
    ) -> Result<Self> {
        let params = ModelParams {
            temperature: Some(model_config.temperature),
            max_tokens: model_config.max_tokens,
        };

        match provider_config {
            ProviderConfig::Ollama { base_url, .. } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model_config.model.clone(),
                params,
            }),
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                ..
            } => {
                let api_key = std::env::var(api_key_env).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' is not set",
                        api_key_env
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model_config.model.clone(),
                    params,
                })
            }
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// The model identifier this provider will be asked for
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}
