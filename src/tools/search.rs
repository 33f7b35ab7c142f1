//! Web search tool
//!
//! Runs one query against the configured [`SearchClient`], drops duplicate URLs,
//! summarizes full page text with the summarization model and formats the result
//! as numbered source blocks.

use crate::llm::LLMClient;
use crate::research::notes::{
    deduplicate, format_search_output, summarize_all, NO_RESULTS_MESSAGE,
};
use crate::research::researcher::WEB_SEARCH_TOOL;
use crate::search::{SearchClient, SearchOptions};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
}

pub struct WebSearchTool {
    search: Arc<dyn SearchClient>,
    summarizer: Arc<dyn LLMClient>,
    options: SearchOptions,
    /// Raw text kept when summarization fails
    fallback_chars: usize,
}

impl WebSearchTool {
    pub fn new(
        search: Arc<dyn SearchClient>,
        summarizer: Arc<dyn LLMClient>,
        options: SearchOptions,
        fallback_chars: usize,
    ) -> Self {
        Self {
            search,
            summarizer,
            options,
            fallback_chars,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web and return summarized sources for one query"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: WebSearchArgs = serde_json::from_value(args)
            .map_err(|_| AppError::InvalidInput("Missing 'query' parameter".to_string()))?;

        tracing::debug!(query = %args.query, backend = self.search.name(), "Web search");
        let results = self.search.search(&args.query, &self.options).await?;
        let hits = results.len();

        let unique = deduplicate(vec![results]);
        tracing::debug!(hits, unique = unique.len(), "Deduplicated search results");
        if unique.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }
        let sources = summarize_all(self.summarizer.as_ref(), &unique, self.fallback_chars).await;

        Ok(format_search_output(&sources))
    }
}
