// src/checker/limiter.rs
// =============================================================================
// Caps how many requests are in flight, both overall and per host.
//
// Two kinds of semaphore permits are handed out:
// - one global semaphore shared by every request
// - one semaphore per destination host ("host:port")
//
// A request waits for its host permit before it asks for a global one. That
// way a request queued behind a busy host doesn't sit on a global slot that a
// request to an idle host could be using. Nothing is ever rejected: callers
// simply wait until a permit is free.
// =============================================================================

use std::collections::HashMap;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

pub struct HostLimiter {
    global: Semaphore,
    per_host: HashMap<String, Semaphore>,
    per_host_limit: usize,
}

/// Both permits for one request. Dropping it frees the slots.
pub struct RequestPermit<'a> {
    _global: SemaphorePermit<'a>,
    _host: Option<SemaphorePermit<'a>>,
}

impl HostLimiter {
    /// Creates a limiter with a semaphore for every host among `urls`.
    ///
    /// All hosts are known before checking starts, so the map is never
    /// written to afterwards and needs no lock.
    pub fn new<'u>(
        urls: impl IntoIterator<Item = &'u str>,
        max_concurrent: usize,
        per_host_limit: usize,
    ) -> Self {
        let mut per_host = HashMap::new();
        for url in urls {
            per_host
                .entry(host_key(url))
                .or_insert_with(|| Semaphore::new(per_host_limit));
        }

        Self {
            global: Semaphore::new(max_concurrent),
            per_host,
            per_host_limit,
        }
    }

    /// Waits until `url` may be requested.
    ///
    /// A url the limiter wasn't built with only counts against the global cap.
    pub async fn acquire(&self, url: &str) -> RequestPermit<'_> {
        // The semaphores are never closed, so acquire can't fail
        let host_permit = match self.per_host.get(&host_key(url)) {
            Some(host) => Some(host.acquire().await.expect("host semaphore closed")),
            None => None,
        };
        let global_permit = self.global.acquire().await.expect("global semaphore closed");

        RequestPermit {
            _global: global_permit,
            _host: host_permit,
        }
    }

    pub fn per_host_limit(&self) -> usize {
        self.per_host_limit
    }

    pub fn host_count(&self) -> usize {
        self.per_host.len()
    }
}

// The key a request is counted under. Scheme default ports are filled in so
// "http://a.com" and "http://a.com:80" share a bucket while http and https to
// the same name don't. Strings that aren't URLs share the empty bucket; their
// request fails before any connection is made.
fn host_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}:{}",
            parsed.host_str().unwrap_or_default(),
            parsed.port_or_known_default().unwrap_or_default()
        ),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{FuturesUnordered, StreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_host_key() {
        assert_eq!(host_key("http://a.com/1"), "a.com:80");
        assert_eq!(host_key("http://a.com:80/2"), "a.com:80");
        assert_eq!(host_key("https://a.com/"), "a.com:443");
        assert_eq!(host_key("http://a.com:8080/"), "a.com:8080");
        assert_eq!(host_key("nonsense"), "");
    }

    #[test]
    fn test_one_semaphore_per_host() {
        let urls = ["http://a.com/1", "http://a.com/2", "http://b.com/x"];
        let limiter = HostLimiter::new(urls, 50, 10);
        assert_eq!(limiter.host_count(), 2);
        assert_eq!(limiter.per_host_limit(), 10);
    }

    // Tracks the highest number of holders seen at the same time
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Gauge {
        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_caps_are_never_exceeded() {
        let mut urls = Vec::new();
        for i in 0..30 {
            urls.push(format!("http://a.com/{}", i));
            urls.push(format!("http://b.com/{}", i));
            urls.push(format!("http://c.com/{}", i));
        }

        let limiter = HostLimiter::new(urls.iter().map(String::as_str), 5, 2);
        let total = Gauge::default();
        let a_host = Gauge::default();

        let mut checks: FuturesUnordered<_> = urls
            .iter()
            .map(|url| {
                let (limiter, total, a_host) = (&limiter, &total, &a_host);
                async move {
                    let _permit = limiter.acquire(url).await;
                    let on_a = url.starts_with("http://a.com");
                    total.enter();
                    if on_a {
                        a_host.enter();
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    if on_a {
                        a_host.leave();
                    }
                    total.leave();
                }
            })
            .collect();

        let mut finished = 0;
        while checks.next().await.is_some() {
            finished += 1;
        }

        assert_eq!(finished, 90);
        assert!(total.peak() <= 5, "global peak was {}", total.peak());
        assert!(a_host.peak() <= 2, "per-host peak was {}", a_host.peak());
        // With three hosts and two slots each, the global cap is reachable
        assert_eq!(total.peak(), 5);
    }

    #[tokio::test]
    async fn test_waiting_requests_queue_instead_of_failing() {
        let urls = ["http://a.com/1", "http://a.com/2"];
        let limiter = HostLimiter::new(urls, 10, 1);

        let first = limiter.acquire("http://a.com/1").await;
        let second = limiter.acquire("http://a.com/2");
        tokio::pin!(second);

        // The second request can't start while the first holds the host slot
        let blocked = tokio::time::timeout(Duration::from_millis(20), &mut second).await;
        assert!(blocked.is_err());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), second)
            .await
            .expect("second request should start once the first finished");
    }
}
