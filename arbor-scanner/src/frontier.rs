//! The crawl frontier: the set of canonical URLs accepted so far.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::debug;

use crate::normalize::{is_in_scope, normalize};

struct FrontierState {
    seen: HashSet<String>,
    // Append-only log of accepted URLs, in discovery order.
    discovered: Vec<String>,
}

/// Deduplicating, scope-filtering sink for raw links discovered while
/// crawling a site.
///
/// The frontier owns the seen-set; callers only get `offer` and snapshot
/// accessors. `offer` performs the check-and-insert under a single lock so
/// concurrent fetch workers can never both accept the same URL.
pub struct Frontier {
    base_url: String,
    state: Mutex<FrontierState>,
}

impl Frontier {
    /// Create a frontier for a site. The base URL itself counts as already
    /// discovered, so the start page is always part of the crawl output.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let mut seen = HashSet::new();
        seen.insert(base_url.clone());

        Self {
            state: Mutex::new(FrontierState {
                seen,
                discovered: vec![base_url.clone()],
            }),
            base_url,
        }
    }

    /// Offer a raw link to the frontier.
    ///
    /// Returns the canonical URL when it is new and in scope for the site,
    /// `None` when it was already seen or is out of scope. Dedup is keyed on
    /// the canonical string, so equivalent raw forms (`foo`, `/foo`,
    /// `{base}/foo`) yield exactly one acceptance.
    pub async fn offer(&self, raw_link: &str) -> Option<String> {
        let url = normalize(raw_link, &self.base_url);
        if !is_in_scope(&url, &self.base_url) {
            debug!("out of scope, dropping: {url}");
            return None;
        }

        let mut state = self.state.lock().await;
        if !state.seen.insert(url.clone()) {
            return None;
        }
        state.discovered.push(url.clone());
        Some(url)
    }

    /// Number of URLs accepted so far, the seeded base URL included.
    pub async fn len(&self) -> usize {
        self.state.lock().await.discovered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the discovery log, in discovery order.
    pub async fn discovered(&self) -> Vec<String> {
        self.state.lock().await.discovered.clone()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://sub.domain.com";

    #[tokio::test]
    async fn seeds_base_url() {
        let frontier = Frontier::new(BASE);
        assert_eq!(vec![BASE.to_string()], frontier.discovered().await);
        assert_eq!(1, frontier.len().await);
    }

    #[tokio::test]
    async fn accepts_new_in_scope_links() {
        let frontier = Frontier::new(BASE);

        let accepted = frontier.offer("/foo").await;
        assert_eq!(Some("http://sub.domain.com/foo".to_string()), accepted);
        assert_eq!(2, frontier.len().await);
    }

    #[tokio::test]
    async fn dedups_equivalent_raw_forms() {
        let frontier = Frontier::new(BASE);

        assert!(frontier.offer("foo").await.is_some());
        assert!(frontier.offer("/foo").await.is_none());
        assert!(frontier.offer("http://sub.domain.com/foo").await.is_none());

        assert_eq!(2, frontier.len().await);
    }

    #[tokio::test]
    async fn base_url_is_never_accepted_twice() {
        let frontier = Frontier::new(BASE);

        assert!(frontier.offer("/").await.is_none());
        assert!(frontier.offer("http://sub.domain.com/").await.is_none());

        assert_eq!(vec![BASE.to_string()], frontier.discovered().await);
    }

    #[tokio::test]
    async fn drops_out_of_scope_links() {
        let frontier = Frontier::new(BASE);

        assert!(frontier.offer("https://google.com/").await.is_none());
        assert!(frontier.offer("/logo.png").await.is_none());
        assert!(frontier.offer("mailto:anon@domain.com").await.is_none());
        assert!(frontier.offer("/foo#section").await.is_none());

        assert_eq!(1, frontier.len().await);
    }
}
