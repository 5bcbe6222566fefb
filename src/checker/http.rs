// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes one HTTP GET per link (no retries)
// - Records the status code, or the reason the request never got one
// - Runs every check concurrently, capped globally and per host
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Option<T>: status and error are each present only in one outcome
// - Enums: To name the different ways a request can fail
// - FuturesUnordered: For driving many futures from a single task
// =============================================================================

use futures::stream::{FuturesUnordered, StreamExt}; // StreamExt gives us .next()
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

use super::limiter::HostLimiter;

// The ways a request can fail before we get a status code back
//
// Each variant has a short tag that ends up in the `error` field of the
// JSON report, so these names are part of our output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response within the configured timeout
    Timeout,
    /// Could not resolve hostname
    Dns,
    /// Connection refused, reset or unreachable
    Connect,
    /// SSL/TLS handshake or certificate error
    Tls,
    /// Too many redirects (or a redirect loop)
    Redirect,
    /// The link couldn't be turned into a request at all
    InvalidUrl,
    /// The response body or headers couldn't be read
    Body,
    /// Anything else reqwest reports while sending
    Request,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Dns => "dns",
            ErrorKind::Connect => "connect",
            ErrorKind::Tls => "tls",
            ErrorKind::Redirect => "redirect",
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::Body => "body",
            ErrorKind::Request => "request",
            ErrorKind::Other => "other",
        }
    }

    // Categorizes a reqwest error
    //
    // reqwest only has flags for some of the failures we care about
    // (timeouts, redirects, connect errors). DNS and TLS problems show up
    // as connect errors, so we look at the messages of the underlying
    // errors to tell them apart.
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return ErrorKind::Timeout;
        }
        if error.is_redirect() {
            return ErrorKind::Redirect;
        }
        if error.is_builder() {
            return ErrorKind::InvalidUrl;
        }

        // Only the causes: reqwest's own message contains the URL, and a host
        // named "ssl.example.com" says nothing about how the request failed
        let causes = error
            .source()
            .map(|cause| error_chain(cause).to_lowercase())
            .unwrap_or_default();
        if causes.contains("dns error") || causes.contains("failed to lookup address") {
            ErrorKind::Dns
        } else if causes.contains("certificate")
            || causes.contains("tls")
            || causes.contains("ssl")
            || causes.contains("handshake")
        {
            ErrorKind::Tls
        } else if error.is_connect() {
            ErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            ErrorKind::Body
        } else if error.is_request() {
            ErrorKind::Request
        } else {
            ErrorKind::Other
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Represents the result of checking a single link
//
// Exactly one of `status` and `error` is set. The fields are public so the
// report code can read them, but results are only ever created through
// `from_status` and `from_error`, which keep `ok` consistent with `status`.
//
// Option fields serialize as null, so every record in the JSON report has
// all five keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
    /// The URL that was checked
    pub url: String,
    /// HTTP status code of the final response
    pub status: Option<u16>,
    /// Reason phrase for the status, or a description of the failure
    pub reason: String,
    /// true iff the status is in 200..400
    pub ok: bool,
    /// Short failure tag (see ErrorKind)
    pub error: Option<String>,
}

impl LinkResult {
    /// Result for a link that produced an HTTP response.
    pub fn from_status(url: String, status: StatusCode) -> Self {
        let code = status.as_u16();
        Self {
            url,
            status: Some(code),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            ok: is_ok_status(code),
            error: None,
        }
    }

    /// Result for a link whose request failed before a response arrived.
    pub fn from_error(url: String, kind: ErrorKind, description: String) -> Self {
        Self {
            url,
            status: None,
            reason: description,
            ok: false,
            error: Some(kind.as_str().to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

// 2xx and 3xx count as working. A 3xx only shows up here when redirects
// aren't followed (or the server sent one without a Location header).
pub fn is_ok_status(code: u16) -> bool {
    (200..400).contains(&code)
}

// How many checks may run at once
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_concurrent: usize,
    pub per_host_limit: usize,
}

// Checks multiple links concurrently
//
// This is the main entry point for link checking.
// It takes the URLs to check and returns one result for each of them,
// in the order the checks finished.
//
// All checks are futures driven by this one task. A check first waits for
// its permits from the limiter, so at most `max_concurrent` requests (and
// `per_host_limit` per host) are on the network at any moment; the rest wait
// their turn. A failing check only affects its own result.
pub async fn check_links<I>(client: &Client, urls: I, limits: Limits) -> Vec<LinkResult>
where
    I: IntoIterator<Item = String>,
{
    let urls: Vec<String> = urls.into_iter().collect();
    let limiter = HostLimiter::new(
        urls.iter().map(String::as_str),
        limits.max_concurrent,
        limits.per_host_limit,
    );

    tracing::debug!(
        links = urls.len(),
        hosts = limiter.host_count(),
        max_concurrent = limits.max_concurrent,
        per_host_limit = limiter.per_host_limit(),
        "checking links"
    );

    let mut checks: FuturesUnordered<_> = urls
        .into_iter()
        .map(|url| {
            let limiter = &limiter;
            async move {
                let _permit = limiter.acquire(&url).await;
                check_single_link(client, url).await
            }
        })
        .collect();

    let mut results = Vec::with_capacity(checks.len());
    while let Some(result) = checks.next().await {
        results.push(result);
    }
    results
}

// Checks a single link
//
// Only the status line and headers are waited for; the body is dropped
// unread together with the response.
//
// Parameters:
//   client: reqwest HTTP client (borrowed, shared by all checks)
//   url: the URL to check (owned String, moved into the result)
pub async fn check_single_link(client: &Client, url: String) -> LinkResult {
    let result = match client.get(&url).send().await {
        Ok(response) => LinkResult::from_status(url, response.status()),
        Err(e) => LinkResult::from_error(url, ErrorKind::classify(&e), error_chain(&e)),
    };

    match &result.error {
        None => tracing::debug!(url = %result.url, status = ?result.status, ok = result.ok, "checked"),
        Some(kind) => tracing::debug!(url = %result.url, error = %kind, reason = %result.reason, "check failed"),
    }

    result
}

// Formats an error together with everything it wraps
//
// reqwest's own message is usually just "error sending request for url
// (...)"; the interesting part (timed out, connection refused, ...) is in
// the source errors.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why FuturesUnordered instead of spawning tasks?
//    - Every check lives on the task that called check_links
//    - While one check waits for the network, the others get polled
//    - Nothing is 'static, so the checks can borrow the client and limiter
//
// 2. Why is the result order random?
//    - next() returns whichever check finished first
//    - The caller sorts the results afterwards
//
// 3. What is &(dyn StdError + 'static)?
//    - A reference to "any error type"
//    - source() lets us walk from an error to the error that caused it
// -----------------------------------------------------------------------------
