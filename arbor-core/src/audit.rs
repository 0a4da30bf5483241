//! Audit execution and aggregation.
//!
//! The crawl phase and the audit phase are sequential: the sitemap is fully
//! materialized and persisted before any page is evaluated. Page
//! evaluations run on a bounded concurrent batch; aggregation waits for the
//! whole batch because top-N rankings need the complete finding set.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use arbor_scanner::{CrawlConfig, ProgressCallback, SiteCrawler};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::axe::Evaluator;
use crate::error::Result;
use crate::finding::{AuditType, Finding, classify_results};
use crate::page::Page;
use crate::report;
use crate::site::{Grouping, Site};

/// Default length of the top-N ranking tables.
pub const TOP_GROUP_LIMIT: usize = 10;

/// Run configuration for a site audit.
#[derive(Clone)]
pub struct AuditConfig {
    pub crawl: CrawlConfig,
    /// How many pages are evaluated in parallel.
    pub evaluation_concurrency: usize,
    /// Reported once per fetched URL during the crawl phase.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            crawl: CrawlConfig::default(),
            evaluation_concurrency: 4,
            progress_callback: None,
        }
    }
}

/// Crawl the site and persist its sitemap. Returns the sitemap path and the
/// canonical URL list.
pub async fn generate_sitemap(
    site: &Site,
    config: &CrawlConfig,
    progress_callback: Option<ProgressCallback>,
) -> Result<(PathBuf, Vec<String>)> {
    let mut crawler = SiteCrawler::with_config(config.clone());
    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(callback);
    }

    let urls = crawler.crawl(&site.base_url()).await?;

    let path = site.sitemap_path();
    report::write_sitemap(&path, site.fqdn(), &urls, site.started_at())?;
    info!("Sitemap for {} written to {}", site.fqdn(), path.display());

    Ok((path, urls))
}

/// Crawl a site, evaluate every sitemap URL, and aggregate the findings.
pub async fn audit_site<E: Evaluator>(
    site: &Site,
    evaluator: &E,
    config: &AuditConfig,
) -> Result<SiteAudit> {
    let run_started = Instant::now();

    let (sitemap_path, _) =
        generate_sitemap(site, &config.crawl, config.progress_callback.clone()).await?;
    // Re-read the persisted file so an audit always works from exactly what
    // the operator can inspect on disk.
    let urls = report::read_sitemap(&sitemap_path)?;

    let pages = evaluate_pages(
        urls,
        evaluator,
        site.audit_type(),
        config.evaluation_concurrency,
    )
    .await;

    Ok(SiteAudit {
        domain: site.fqdn().to_string(),
        grouping: site.grouping(),
        audit_type: site.audit_type(),
        csv_path: site_csv_path(site),
        pages,
        created_at: Utc::now(),
        runtime: run_started.elapsed(),
    })
}

/// Audit just the site's own URL, without crawling.
pub async fn audit_page<E: Evaluator>(site: &Site, evaluator: &E) -> Result<PageAudit> {
    let run_started = Instant::now();
    let audit_type = site.audit_type();

    let pages = evaluate_pages(vec![site.url.clone()], evaluator, audit_type, 1).await;
    let page = pages.into_iter().next().unwrap_or_else(|| Page::new(site.url.clone()));

    Ok(PageAudit {
        csv_path: page_csv_path(site),
        page,
        audit_type,
        created_at: Utc::now(),
        runtime: run_started.elapsed(),
    })
}

/// Evaluate a batch of pages with bounded concurrency. Each page owns its
/// findings; a failed evaluation leaves the page unaudited and never aborts
/// the batch.
async fn evaluate_pages<E: Evaluator>(
    urls: Vec<String>,
    evaluator: &E,
    audit_type: AuditType,
    concurrency: usize,
) -> Vec<Page> {
    stream::iter(urls)
        .map(|url| async move {
            let mut page = Page::new(url);
            match evaluator.evaluate(&page.url).await {
                Ok(results) => {
                    page.findings = classify_results(&results, &page.url, audit_type);
                    page.audited = true;
                }
                Err(e) => {
                    warn!("Evaluation failed for {}, page skipped: {}", page.url, e);
                }
            }
            page
        })
        // `buffered` keeps sitemap order, which is what makes ranking ties
        // stable.
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn site_csv_path(site: &Site) -> PathBuf {
    site.audit_dir().join(format!(
        "{}-site-{}-violations.csv",
        site.slug(),
        site.audit_type().as_str()
    ))
}

fn page_csv_path(site: &Site) -> PathBuf {
    let without_scheme = site
        .url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&site.url);
    let cleaned: String = without_scheme
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .replace('.', "-");

    site.audit_dir().join(format!(
        "{}-page-{}-violations.csv",
        cleaned,
        site.audit_type().as_str()
    ))
}

/// Aggregated result of a full-site audit: a read-only view recomputed from
/// the pages' findings on demand.
#[derive(Debug, Clone)]
pub struct SiteAudit {
    pub domain: String,
    pub pages: Vec<Page>,
    pub grouping: Grouping,
    pub audit_type: AuditType,
    pub csv_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub runtime: Duration,
}

impl SiteAudit {
    pub fn findings(&self) -> Vec<&Finding> {
        self.pages.iter().flat_map(|p| p.findings.iter()).collect()
    }

    pub fn errors(&self) -> Vec<&Finding> {
        self.pages
            .iter()
            .flat_map(|p| p.findings.iter())
            .filter(|f| f.is_error())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Finding> {
        self.pages
            .iter()
            .flat_map(|p| p.findings.iter())
            .filter(|f| f.is_warning())
            .collect()
    }

    /// Pages whose evaluation failed; they contributed zero findings.
    pub fn unaudited_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.audited).count()
    }

    /// Pages ranked descending by finding count. Ties keep input order.
    pub fn top_pages(&self, limit: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .pages
            .iter()
            .map(|p| (p.url.clone(), p.findings.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }

    /// Templates ranked descending by summed finding count across their
    /// pages. Pages without a template are excluded.
    pub fn top_templates(&self, limit: usize) -> Vec<(String, usize)> {
        self.top_groups(limit, |p| p.template())
    }

    pub fn top_subtemplates(&self, limit: usize) -> Vec<(String, usize)> {
        self.top_groups(limit, |p| p.subtemplate())
    }

    fn top_groups(
        &self,
        limit: usize,
        key: impl Fn(&Page) -> Option<String>,
    ) -> Vec<(String, usize)> {
        // Groups keep first-encountered order so the stable sort preserves
        // it among equal counts.
        let mut groups: Vec<(String, usize)> = Vec::new();

        for page in &self.pages {
            let Some(label) = key(page) else { continue };
            match groups.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, count)) => *count += page.findings.len(),
                None => groups.push((label, page.findings.len())),
            }
        }

        groups.sort_by(|a, b| b.1.cmp(&a.1));
        groups.truncate(limit);
        groups
    }

    pub fn write_violations_csv(&self) -> Result<PathBuf> {
        report::write_violations_csv(&self.csv_path, &self.findings())?;
        Ok(self.csv_path.clone())
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("\nSite Audit Summary\n------------------\n");
        out.push_str(&format!("domain:       {}\n", self.domain));
        out.push_str(&format!("pages:        {}\n", self.pages.len()));
        out.push_str(&format!("violations:   {}\n", self.findings().len()));
        out.push_str(&format!(" - errors:    {}\n", self.errors().len()));
        out.push_str(&format!(" - warnings:  {}\n", self.warnings().len()));
        if self.unaudited_pages() > 0 {
            out.push_str(&format!("unaudited pages: {}\n", self.unaudited_pages()));
        }
        out.push('\n');

        match self.grouping {
            Grouping::Templates => {
                out.push_str("Top Templates by Violations:\n");
                out.push_str(&format_groups(&self.top_templates(TOP_GROUP_LIMIT)));
                out.push_str("\nTop Subtemplates by Violations:\n");
                out.push_str(&format_groups(&self.top_subtemplates(TOP_GROUP_LIMIT)));
            }
            Grouping::Pages => {
                out.push_str("Top Pages by Violations:\n");
                out.push_str(&format_groups(&self.top_pages(TOP_GROUP_LIMIT)));
            }
        }

        out.push_str(&format!(
            "\ncreated:      {}\n",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!("runtime:      {:.1}s\n", self.runtime.as_secs_f64()));
        out.push_str(&format!("\nViolations CSV: {}\n", self.csv_path.display()));
        out
    }
}

/// Result of a single-page audit.
#[derive(Debug, Clone)]
pub struct PageAudit {
    pub page: Page,
    pub audit_type: AuditType,
    pub csv_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub runtime: Duration,
}

impl PageAudit {
    pub fn errors(&self) -> Vec<&Finding> {
        self.page.findings.iter().filter(|f| f.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&Finding> {
        self.page.findings.iter().filter(|f| f.is_warning()).collect()
    }

    pub fn write_violations_csv(&self) -> Result<PathBuf> {
        let findings: Vec<&Finding> = self.page.findings.iter().collect();
        report::write_violations_csv(&self.csv_path, &findings)?;
        Ok(self.csv_path.clone())
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("\nPage Audit Summary\n------------------\n");
        out.push_str(&format!("url:          {}\n", self.page.url));
        out.push_str(&format!("violations:   {}\n", self.page.findings.len()));
        out.push_str(&format!(" - errors:    {}\n", self.errors().len()));
        out.push_str(&format!(" - warnings:  {}\n", self.warnings().len()));
        if !self.page.audited {
            out.push_str("note: page could not be evaluated\n");
        }
        out.push_str(&format!(
            "\ncreated:      {}\n",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!("runtime:      {:.1}s\n", self.runtime.as_secs_f64()));
        out.push_str(&format!("\nViolations CSV: {}\n", self.csv_path.display()));
        out
    }
}

fn format_groups(groups: &[(String, usize)]) -> String {
    let mut lines = String::new();
    for (label, count) in groups {
        lines.push_str(&format!("{label}: {count}\n"));
    }
    lines
}
