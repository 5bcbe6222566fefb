// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: Makes HTTP requests to check if links are alive
// - html: Extracts links from HTML pages
// - limiter: Caps how many requests run at once, overall and per host
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod html;
mod http;
mod limiter;

// Re-export public items from submodules
// This lets users write `checker::check_links()` instead of
// `checker::http::check_links()`
pub use html::extract_html_links;
pub use http::{check_links, ErrorKind, LinkResult, Limits};
