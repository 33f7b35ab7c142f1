//! # A.R.E.S Deep Research
//!
//! Multi-agent web research in Rust. A supervisor model splits a research question
//! into independent sub-topics, hands each one to an isolated researcher that
//! searches the web and reflects on what it found, waits for every researcher in a
//! batch, and finally writes a cited report from the merged notes.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ares_research::{
//!     create_search_client, ProviderRegistry, ResearchConfig, ResearchCoordinator, SessionOutcome,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResearchConfig::load("research.toml")?;
//!     let clients = ProviderRegistry::from_config(&config).role_clients(&config)?;
//!     let search = create_search_client(&config.search)?;
//!
//!     let coordinator = ResearchCoordinator::from_config(&config, clients, search);
//!     let (_session, outcome) = coordinator.research("Compare solar vs wind efficiency").await?;
//!
//!     match outcome {
//!         SessionOutcome::Completed { report, .. } => println!("{}", report),
//!         SessionOutcome::NeedsClarification { question } => println!("{}", question),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing Against Fakes
//!
//! Every external service sits behind a trait ([`LLMClient`], [`SearchClient`],
//! [`research::ResearchWorker`]) and is passed in explicitly, so the supervisor and
//! researcher loops run unchanged against scripted fakes.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI and compatible APIs (default) |
//!
//! ## Modules
//!
//! - [`research`] - Supervisor, researcher, notes pipeline and session orchestration
//! - [`llm`] - LLM client implementations
//! - [`search`] - Web search backends
//! - [`tools`] - Researcher tools and registry
//! - [`types`] - Messages, tool calls and error handling
//! - [`utils`] - `research.toml` configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Multi-agent research coordination.
pub mod research;
/// Web search backends.
pub mod search;
/// Researcher tools (web search, reflection).
pub mod tools;
/// Core types (messages, tool calls, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, LLMResponse, Provider, ProviderRegistry, RoleClients};
pub use research::{PhaseEnd, ResearchCoordinator, ResearchSession, SessionOutcome};
pub use search::{create_search_client, SearchClient, SearchOptions, SearchResult};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Message, Result};
pub use utils::toml_config::{ConfigError, ResearchConfig};
