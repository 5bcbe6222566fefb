// src/session.rs
// =============================================================================
// Runs one check from start to finish.
//
// The phases are strictly sequential:
// 1. Extract the links of the starting page
// 2. Keep at most `max_links` of them
// 3. Check them all concurrently
// 4. Sort: broken links first, then by URL
//
// Everything a run produces is returned in a CheckSession; nothing outlives
// the call.
// =============================================================================

use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::checker::{self, LinkResult, Limits};
use crate::config::CheckerConfig;
use crate::crawl;

/// Everything one run found out about one page.
#[derive(Debug)]
pub struct CheckSession {
    pub seed: String,
    /// Every link found on the page, including any over the `max_links` cap.
    pub discovered: HashSet<String>,
    /// One result per checked link, sorted with `sort_results`.
    pub results: Vec<LinkResult>,
}

impl CheckSession {
    pub fn summary(&self) -> Summary {
        Summary::of(&self.results)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub working: usize,
    pub broken: usize,
}

impl Summary {
    pub fn of(results: &[LinkResult]) -> Self {
        let working = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total: results.len(),
            working,
            broken: results.len() - working,
        }
    }
}

/// Extracts the links of `start_url`, checks up to `max_links` of them and
/// returns the sorted results.
///
/// Only building the HTTP client can fail. A page that can't be loaded
/// produces a session with no results.
pub async fn run(config: &CheckerConfig, start_url: &str, max_links: usize) -> Result<CheckSession> {
    let client = config
        .build_client()
        .context("failed to build HTTP client")?;

    tracing::info!(page = start_url, "starting link check");

    let discovered = crawl::extract_links(&client, start_url).await;
    tracing::info!(links = discovered.len(), "found links to check");

    let selected = select_links(&discovered, max_links);
    if selected.len() < discovered.len() {
        tracing::warn!(
            found = discovered.len(),
            checking = selected.len(),
            "more links than --max-links, skipping the rest"
        );
    }

    let limits = Limits {
        max_concurrent: config.max_concurrent,
        per_host_limit: config.per_host_limit,
    };
    let mut results = checker::check_links(&client, selected, limits).await;
    sort_results(&mut results);

    let summary = Summary::of(&results);
    tracing::info!(
        working = summary.working,
        broken = summary.broken,
        "link check finished"
    );

    Ok(CheckSession {
        seed: start_url.to_string(),
        discovered,
        results,
    })
}

// Picks the links that will be checked
//
// Which links make the cut when there are more than `max_links` is not
// defined: it's whatever order the HashSet iterates in.
fn select_links(discovered: &HashSet<String>, max_links: usize) -> Vec<String> {
    discovered.iter().take(max_links).cloned().collect()
}

/// Broken links first, then working ones; each group ordered by URL bytes.
pub fn sort_results(results: &mut [LinkResult]) {
    // false < true, so broken links come first
    results.sort_by(|a, b| a.ok.cmp(&b.ok).then_with(|| a.url.cmp(&b.url)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn working(url: &str) -> LinkResult {
        LinkResult::from_status(url.to_string(), StatusCode::OK)
    }

    fn broken(url: &str) -> LinkResult {
        LinkResult::from_status(url.to_string(), StatusCode::NOT_FOUND)
    }

    fn assert_sorted(results: &[LinkResult]) {
        for pair in results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.ok == b.ok {
                assert!(a.url < b.url, "{} should come after {}", a.url, b.url);
            } else {
                assert!(!a.ok && b.ok, "working link {} listed before a broken one", a.url);
            }
        }
    }

    #[test]
    fn test_sort_broken_first_then_by_url() {
        let mut results = vec![
            working("http://a.com/1"),
            broken("http://b.com/x"),
            working("http://a.com/0"),
            broken("http://a.com/2"),
        ];
        sort_results(&mut results);

        let order: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            order,
            vec!["http://a.com/2", "http://b.com/x", "http://a.com/0", "http://a.com/1"]
        );
        assert_sorted(&results);
    }

    #[test]
    fn test_sort_uses_byte_order() {
        let mut results = vec![working("http://a.com/a"), working("http://a.com/B")];
        sort_results(&mut results);
        // 'B' (0x42) sorts before 'a' (0x61)
        assert_eq!(results[0].url, "http://a.com/B");
    }

    #[test]
    fn test_summary() {
        let results = vec![working("http://a.com/"), broken("http://b.com/"), broken("http://c.com/")];
        assert_eq!(
            Summary::of(&results),
            Summary {
                total: 3,
                working: 1,
                broken: 2
            }
        );
        assert_eq!(
            Summary::of(&[]),
            Summary {
                total: 0,
                working: 0,
                broken: 0
            }
        );
    }

    #[test]
    fn test_select_links_caps_count() {
        let discovered: HashSet<String> = (0..5).map(|i| format!("http://a.com/{}", i)).collect();

        let selected = select_links(&discovered, 2);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|url| discovered.contains(url)));
        assert_ne!(selected[0], selected[1]);

        assert_eq!(select_links(&discovered, 1000).len(), 5);
        assert!(select_links(&discovered, 0).is_empty());
    }

    #[tokio::test]
    async fn test_run_reports_broken_before_working() {
        let mut server = mockito::Server::new_async().await;

        // Accepts connections but never answers, so requests to it time out
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let silent_url = format!("http://{}/x", silent.local_addr().unwrap());
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = silent.accept().await {
                open.push(socket);
            }
        });

        let page = format!(
            r#"<a href="{base}/1">one</a><a href="{base}/2">two</a><a href="{silent}">x</a>"#,
            base = server.url(),
            silent = silent_url,
        );
        server.mock("GET", "/").with_status(200).with_body(page).create_async().await;
        server.mock("GET", "/1").with_status(200).create_async().await;
        server.mock("GET", "/2").with_status(404).create_async().await;

        let config = CheckerConfig {
            timeout: Duration::from_millis(500),
            ..CheckerConfig::default()
        };
        let session = run(&config, &format!("{}/", server.url()), 1000).await.unwrap();

        assert_eq!(session.discovered.len(), 3);
        assert_eq!(session.results.len(), 3);
        assert_sorted(&session.results);

        let find = |url: &str| session.results.iter().find(|r| r.url == url).unwrap();
        let one = find(&format!("{}/1", server.url()));
        let two = find(&format!("{}/2", server.url()));
        let x = find(&silent_url);

        assert_eq!((one.status, one.ok), (Some(200), true));
        assert_eq!((two.status, two.ok), (Some(404), false));
        assert_eq!((x.status, x.ok), (None, false));
        assert_eq!(x.error.as_deref(), Some("timeout"));

        // The working link comes last
        assert_eq!(session.results[2].url, one.url);
        assert_eq!(
            session.summary(),
            Summary {
                total: 3,
                working: 1,
                broken: 2
            }
        );
    }

    #[tokio::test]
    async fn test_run_page_without_links() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<p>nothing to see</p>")
            .create_async()
            .await;

        let session = run(&CheckerConfig::default(), &format!("{}/", server.url()), 1000)
            .await
            .unwrap();

        assert!(session.results.is_empty());
        assert_eq!(session.summary().working, 0);
        assert_eq!(session.summary().broken, 0);
    }

    #[tokio::test]
    async fn test_run_unreachable_page_is_not_fatal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let session = run(&CheckerConfig::default(), &format!("http://{}/", addr), 1000)
            .await
            .unwrap();
        assert!(session.discovered.is_empty());
        assert!(session.results.is_empty());
    }

    #[tokio::test]
    async fn test_run_respects_max_links() {
        let mut server = mockito::Server::new_async().await;
        let page: String = (0..5)
            .map(|i| format!(r#"<a href="/link/{}">{}</a>"#, i, i))
            .collect();
        server.mock("GET", "/").with_status(200).with_body(page).create_async().await;
        let links = server
            .mock("GET", mockito::Matcher::Regex(r"^/link/\d$".to_string()))
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let session = run(&CheckerConfig::default(), &format!("{}/", server.url()), 2)
            .await
            .unwrap();

        links.assert_async().await;
        assert_eq!(session.discovered.len(), 5);
        assert_eq!(session.results.len(), 2);
        assert!(session.results.iter().all(|r| session.discovered.contains(&r.url)));
    }
}
