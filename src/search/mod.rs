//! Web Search Backends
//!
//! The research tools never talk to a search engine directly; they go through the
//! [`SearchClient`] trait so a session can run against DuckDuckGo, Tavily, or a
//! fake in tests.
//!
//! - [`duckduckgo`] - DuckDuckGo via daedra, with page fetch for full text
//! - [`tavily`] - Tavily search API over HTTP

pub mod duckduckgo;
pub mod tavily;

use crate::types::Result;
use crate::utils::toml_config::{SearchBackend, SearchConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use duckduckgo::DuckDuckGoSearch;
pub use tavily::TavilySearch;

/// Topic filter understood by backends that support it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
    Finance,
}

impl SearchTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTopic::General => "general",
            SearchTopic::News => "news",
            SearchTopic::Finance => "finance",
        }
    }
}

/// Options for a single query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub topic: SearchTopic,
    /// Ask the backend for the full page text of each hit
    pub include_raw_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 3,
            topic: SearchTopic::General,
            include_raw_content: true,
        }
    }
}

/// One ranked hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    /// Snippet text
    pub content: String,
    /// Full page text, when requested and available
    pub raw_content: Option<String>,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one query and return hits in rank order
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Build the configured backend
pub fn create_search_client(config: &SearchConfig) -> Result<Arc<dyn SearchClient>> {
    match config.backend {
        SearchBackend::DuckDuckGo => Ok(Arc::new(DuckDuckGoSearch::new())),
        SearchBackend::Tavily => {
            let env = config.api_key_env.as_deref().ok_or_else(|| {
                crate::types::AppError::Configuration(
                    "search.api_key_env is required for the tavily backend".to_string(),
                )
            })?;
            let api_key = std::env::var(env).map_err(|_| {
                crate::types::AppError::Configuration(format!(
                    "Environment variable '{}' is not set",
                    env
                ))
            })?;
            let client = match &config.base_url {
                Some(base) => TavilySearch::with_base_url(api_key, base.clone()),
                None => TavilySearch::new(api_key),
            };
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_serde() {
        let topic: SearchTopic = serde_json::from_str("\"finance\"").unwrap();
        assert_eq!(topic, SearchTopic::Finance);
        assert_eq!(SearchTopic::News.as_str(), "news");
    }

    #[test]
    fn test_create_default_backend() {
        let client = create_search_client(&SearchConfig::default()).unwrap();
        assert_eq!(client.name(), "duckduckgo");
    }

    #[test]
    fn test_create_tavily_without_key_env() {
        let config = SearchConfig {
            backend: SearchBackend::Tavily,
            ..Default::default()
        };
        assert!(create_search_client(&config).is_err());
    }
}
