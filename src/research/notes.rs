//! Search result notes
//!
//! Turns raw search hits into compact evidence for the researchers, and harvests
//! finished tool results back out of a conversation history.

use crate::llm::client::{generate_typed, LLMClient};
use crate::research::prompts;
use crate::search::SearchResult;
use crate::types::Message;
use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Returned by [`format_search_output`] when there is nothing to show
pub const NO_RESULTS_MESSAGE: &str = "No valid search results found. Please try different search queries or use a different search API.";

/// Separator drawn after each source block
const SOURCE_RULE_WIDTH: usize = 80;

/// Hits keyed by URL, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultSet {
    entries: Vec<SearchResult>,
}

impl SearchResultSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchResult> {
        self.entries.iter()
    }
}

/// A source after summarization, ready to be formatted
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNote {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Structured page summary requested from the summarization model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    /// Condensed account of the page
    pub summary: String,
    /// Verbatim quotes worth keeping
    pub key_excerpts: String,
}

impl Summary {
    pub fn render(&self) -> String {
        format!(
            "<summary>\n{}\n</summary>\n\n<key_excerpts>\n{}\n</key_excerpts>",
            self.summary, self.key_excerpts
        )
    }
}

/// Merge result batches, keeping the first hit for every URL.
pub fn deduplicate<I>(batches: I) -> SearchResultSet
where
    I: IntoIterator<Item = Vec<SearchResult>>,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for result in batches.into_iter().flatten() {
        if seen.insert(result.url.clone()) {
            entries.push(result);
        }
    }

    SearchResultSet { entries }
}

/// First `max_chars` characters of `text`, with "..." appended when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Summarize an entry's full page text, or fall back to its snippet.
///
/// Entries without full text keep their snippet. A failed summarization call
/// degrades to the head of the raw page text instead of an error.
pub async fn summarize_or_passthrough(
    client: &dyn LLMClient,
    entry: &SearchResult,
    max_chars: usize,
) -> String {
    let Some(raw) = entry.raw_content.as_deref() else {
        return entry.content.clone();
    };

    let messages = [Message::human(prompts::summarize_webpage_prompt(
        raw,
        &prompts::today(),
    ))];

    match generate_typed::<Summary>(client, &messages).await {
        Ok(summary) => summary.render(),
        Err(e) => {
            tracing::warn!(url = %entry.url, error = %e, "Summarization failed, using raw text");
            truncate_chars(raw, max_chars)
        }
    }
}

/// Summarize every entry concurrently; output keeps the set's order.
pub async fn summarize_all(
    client: &dyn LLMClient,
    set: &SearchResultSet,
    max_chars: usize,
) -> Vec<SourceNote> {
    let contents = join_all(
        set.iter()
            .map(|entry| summarize_or_passthrough(client, entry, max_chars)),
    )
    .await;

    set.iter()
        .zip(contents)
        .map(|(entry, content)| SourceNote {
            url: entry.url.clone(),
            title: entry.title.clone(),
            content,
        })
        .collect()
}

/// Render sources as numbered blocks for the researcher.
pub fn format_search_output(sources: &[SourceNote]) -> String {
    if sources.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let rule = "-".repeat(SOURCE_RULE_WIDTH);
    let mut output = String::from("Search results: \n\n");
    for (i, source) in sources.iter().enumerate() {
        output.push_str(&format!("\n\n--- SOURCE {}: {} ---\n", i + 1, source.title));
        output.push_str(&format!("URL: {}\n\n", source.url));
        output.push_str(&format!("SUMMARY:\n{}\n\n", source.content));
        output.push_str(&rule);
        output.push('\n');
    }
    output
}

/// Payloads of the tool-result turns in `messages`, in order.
pub fn extract_notes(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.is_tool_result())
        .map(|m| m.content().to_string())
        .collect()
}

/// Tool-result and model turns joined into a single raw-notes string.
pub fn collect_raw_notes(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.is_tool_result() || m.is_ai())
        .map(|m| m.content())
        .collect::<Vec<_>>()
        .join("\n")
}
