//! Breadth-first site crawler producing a canonical sitemap.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CrawlError, Result};
use crate::frontier::Frontier;

/// Called once per fetched URL with the fetching worker's id.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Knobs for a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Number of concurrent fetch workers.
    pub workers: usize,
    /// Global deadline for the whole crawl. When it elapses, remaining
    /// frontier entries are abandoned and the partial sitemap is emitted.
    pub crawl_timeout: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            crawl_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            user_agent: "Arbor Crawler/0.1 (+https://github.com/arbor-audit/arbor)".to_string(),
        }
    }
}

/// Drives a [`Frontier`] against live HTTP fetches until exhaustion.
///
/// A single page's fetch failure never aborts the crawl; the URL is logged
/// and skipped. The crawl blocks until no work remains or the global
/// deadline passes.
pub struct SiteCrawler {
    client: Client,
    config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl SiteCrawler {
    pub fn new() -> Self {
        Self::with_config(CrawlConfig::default())
    }

    pub fn with_config(config: CrawlConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl the site rooted at `base_url` and return its sitemap: the
    /// deduplicated, lexicographically sorted list of canonical in-scope
    /// URLs reachable from the base.
    pub async fn crawl(&self, base_url: &str) -> Result<Vec<String>> {
        Url::parse(base_url).map_err(|e| CrawlError::InvalidUrl(format!("{base_url}: {e}")))?;

        info!(
            "Starting crawl of {} with {} workers",
            base_url, self.config.workers
        );

        let frontier = Arc::new(Frontier::new(base_url));
        let pending: Arc<Mutex<VecDeque<String>>> =
            Arc::new(Mutex::new(VecDeque::from([base_url.to_string()])));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let deadline = Instant::now() + self.config.crawl_timeout;

        let mut handles = Vec::new();

        for worker_id in 0..self.config.workers.max(1) {
            let client = self.client.clone();
            let frontier = frontier.clone();
            let pending = pending.clone();
            let in_flight = in_flight.clone();
            let progress_cb = self.progress_callback.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    if Instant::now() >= deadline {
                        debug!("Worker {} hit crawl deadline", worker_id);
                        break;
                    }

                    // Pop and mark in-flight under the same lock so another
                    // worker can't observe an empty queue with zero work
                    // outstanding while this URL is still being fetched.
                    let next = {
                        let mut queue = pending.lock().await;
                        let item = queue.pop_front();
                        if item.is_some() {
                            in_flight.fetch_add(1, Ordering::SeqCst);
                        }
                        item
                    };

                    let Some(url) = next else {
                        if in_flight.load(Ordering::SeqCst) == 0 {
                            debug!("Worker {} found frontier exhausted", worker_id);
                            break;
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    };

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url.clone());
                    }

                    match Self::fetch_links(&client, &url).await {
                        Ok(raw_links) => {
                            for raw_link in raw_links {
                                if let Some(accepted) = frontier.offer(&raw_link).await {
                                    pending.lock().await.push_back(accepted);
                                }
                            }
                        }
                        // Recovered locally: skip this page, keep crawling.
                        Err(e) => {
                            warn!("Fetch failed for {}: {}", url, e);
                        }
                    }

                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            handles.push(handle);
        }

        for handle in handles {
            handle.await?;
        }

        if Instant::now() >= deadline {
            warn!(
                "Crawl deadline reached for {}; emitting partial sitemap",
                base_url
            );
        }

        let mut sitemap = frontier.discovered().await;
        sitemap.sort();
        sitemap.dedup();

        info!("Crawl complete. {} pages in sitemap", sitemap.len());
        Ok(sitemap)
    }

    /// Fetch one URL and return the raw hrefs found on it. Non-HTML
    /// responses contribute no links.
    async fn fetch_links(client: &Client, url: &str) -> Result<Vec<String>> {
        debug!("Fetching {}", url);

        let response = client.get(url).send().await?;

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await?;

        if !is_html {
            return Ok(Vec::new());
        }

        Ok(Self::extract_hrefs(&body))
    }

    /// Pull every `a[href]` value out of an HTML document, unresolved.
    /// Normalization against the site base happens in the frontier.
    fn extract_hrefs(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let link_selector = Selector::parse("a[href]").unwrap();

        document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

impl Default for SiteCrawler {
    fn default() -> Self {
        Self::new()
    }
}
