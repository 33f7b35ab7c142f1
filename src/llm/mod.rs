//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the language model providers the
//! research pipeline talks to. Provider-specific wire formats stay behind the
//! [`LLMClient`] trait, so the supervisor, researchers and report writer work with
//! any supported backend.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection and client construction
//! - [`ProviderRegistry`] - Resolves the named models in `research.toml` to clients
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use ares_research::llm::ProviderRegistry;
//!
//! let registry = ProviderRegistry::from_config(&config);
//! let client = registry.create_client_for_model("default")?;
//!
//! let response = client.generate("What is 2+2?").await?;
//! println!("{}", response);
//! ```

/// Core LLM client trait, response and schema types.
pub mod client;
/// Registry for resolving configured models to clients.
pub mod provider_registry;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{generate_typed, LLMClient, LLMResponse, ModelParams, OutputSchema, Provider};
pub use provider_registry::{ProviderRegistry, RoleClients};
