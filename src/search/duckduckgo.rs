//! DuckDuckGo search via daedra
//!
//! DuckDuckGo only returns snippets, so full page text is fetched separately with
//! daedra's page fetcher. A page that fails to fetch simply has no full text.

use super::{SearchClient, SearchOptions, SearchResult};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use futures::future::join_all;

pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_full_text(url: &str) -> Option<String> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        match daedra::tools::fetch::fetch_page(&fetch_args).await {
            Ok(page) => Some(page.content),
            Err(e) => {
                tracing::debug!(url, error = %e, "Page fetch failed, keeping snippet only");
                None
            }
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: options.max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let mut results: Vec<SearchResult> = response
            .data
            .iter()
            .take(options.max_results)
            .map(|r| SearchResult {
                url: r.url.to_string(),
                title: r.title.to_string(),
                content: r.description.to_string(),
                raw_content: None,
            })
            .collect();

        if options.include_raw_content {
            let pages = join_all(results.iter().map(|r| Self::fetch_full_text(&r.url))).await;
            for (result, page) in results.iter_mut().zip(pages) {
                result.raw_content = page;
            }
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
