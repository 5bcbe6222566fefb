// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), which never rejects
//   a document: broken markup is repaired the way a browser would
//
// We also use the `url` crate to:
// - Resolve relative URLs to absolute URLs
// - Read the scheme of the result so only http/https links are kept
//
// Rust concepts:
// - HashSet: Collects each link once, no matter how often it appears
// - Option<T>: For hrefs that can't be turned into a URL
// - Iterators: For processing collections
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// Extracts all unique http/https links from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: HashSet<String> containing all absolute URLs found
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='/docs'>Again</a>"
//   base_url = "https://example.com"
//   result = {"https://example.com/docs"}
pub fn extract_html_links(html: &str, base_url: &str) -> HashSet<String> {
    let mut links = HashSet::new();

    // Parse the base URL once
    // We'll use this to resolve relative links
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            // If base URL is invalid, we can't resolve relative links
            tracing::warn!(base_url, error = %e, "invalid base URL, no links extracted");
            return links;
        }
    };

    // Parse the HTML into a document
    let document = Html::parse_document(html);

    // "a[href]" means "all <a> tags that have an href attribute"
    // The selector is a constant, so parsing it can only fail on a typo here
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(&base, href) {
                // HashSet::insert ignores links we've already seen
                links.insert(absolute_url);
            }
        }
    }

    links
}

// Resolves a possibly-relative href to an absolute http/https URL
//
// Url::join follows the same rules a browser uses for <a href>:
//   base = "https://example.com/page/"
//   href = "/docs"              -> Some("https://example.com/docs")
//   href = "../other"           -> Some("https://example.com/other")
//   href = "#top"               -> Some("https://example.com/page/#top")
//   href = "https://other.com"  -> Some("https://other.com/")
//   href = "mailto:a@b.c"       -> None (not HTTP)
//
// The joined URL is the only normalization we do. Trailing slashes, case and
// query order are left alone, so "/a" and "/a/" stay two different links.
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href).ok()?;
    if is_checkable_scheme(url.scheme()) {
        Some(url.into())
    } else {
        None
    }
}

// We skip mailto:, tel:, javascript:, data:, file: and everything else
// that isn't fetched over HTTP
fn is_checkable_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a HashSet instead of a Vec?
//    - Pages often link to the same URL many times (menus, footers)
//    - We only want to check each URL once
//    - A HashSet has no order, which is fine: results are sorted later
//
// 2. What does the ? do inside resolve_url?
//    - base.join(href).ok() gives an Option<Url>
//    - ? on an Option returns None early if there is no value
//    - It saves writing a match for every step
//
// 3. Why url.into() instead of url.to_string()?
//    - Url implements From<Url> for String
//    - into() hands over the already-built string instead of formatting
//      the URL again
// -----------------------------------------------------------------------------
