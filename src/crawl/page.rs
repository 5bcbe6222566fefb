// src/crawl/page.rs
// =============================================================================
// This module fetches the starting page and extracts its links.
//
// How it works:
// 1. Validate the page URL
// 2. GET the page (same client, User-Agent and timeout as the link checks)
// 3. Refuse anything that isn't a 2xx/3xx response
// 4. Hand the HTML to the checker's link extractor
//
// A page we can't load is not fatal: the reason is logged and the caller
// gets an empty set, which simply means there is nothing to check.
//
// Rust concepts:
// - thiserror: Deriving Display/Error for our own error enum
// - #[from]: Lets ? convert a reqwest::Error into our error type
// =============================================================================

use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::checker::extract_html_links;

// Why loading the starting page failed
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("page responded with HTTP {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

// Fetches a page and returns the unique http/https links on it
//
// Parameters:
//   client: the shared HTTP client
//   page_url: the page to load
//
// Returns: HashSet of absolute URLs, empty if the page couldn't be loaded
//
// Relative links are resolved against `page_url` itself, even when the
// request was redirected somewhere else.
pub async fn extract_links(client: &Client, page_url: &str) -> HashSet<String> {
    match fetch_page(client, page_url).await {
        Ok(html) => extract_html_links(&html, page_url),
        Err(e) => {
            tracing::error!(page = page_url, error = %e, "could not get links from page");
            HashSet::new()
        }
    }
}

// Fetches a web page and returns its HTML content
async fn fetch_page(client: &Client, page_url: &str) -> Result<String, ExtractError> {
    let url = Url::parse(page_url).map_err(|source| ExtractError::InvalidUrl {
        url: page_url.to_string(),
        source,
    })?;

    let response = client.get(url).send().await?;

    let status = response.status();
    if !(status.is_success() || status.is_redirection()) {
        return Err(ExtractError::Status(status));
    }

    let html = response.text().await?;
    Ok(html)
}
