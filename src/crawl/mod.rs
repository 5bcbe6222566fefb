// src/crawl/mod.rs
// =============================================================================
// This module downloads the page we were asked to check and pulls the links
// out of it.
//
// Only the one starting page is fetched: the links found on it are checked,
// never followed.
// =============================================================================

mod page;

// Re-export the main extraction function
pub use page::extract_links;
