//! The site under audit: identity, scope authority and output locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use crate::error::{AuditError, Result};
use crate::finding::AuditType;

/// How findings are rolled up in the site summary. Fixed per site at audit
/// start; it is configuration, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Group by URL-path template and subtemplate.
    #[default]
    Templates,
    /// Rank individual pages.
    Pages,
}

/// Options applied when resolving a site.
#[derive(Debug, Clone)]
pub struct SiteOptions {
    pub audit_type: AuditType,
    pub grouping: Grouping,
    /// Root directory for sitemaps and reports. Explicit configuration, not
    /// ambient process state.
    pub output_dir: PathBuf,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            audit_type: AuditType::All,
            grouping: Grouping::Templates,
            output_dir: PathBuf::from("audits"),
        }
    }
}

/// Identity of the target being audited.
///
/// The base URL is fixed once the scheme is resolved and is the sole
/// authority for scope-checking every discovered link. Immutable after
/// creation except for the audit-type filter, which may change between
/// successive runs on the same site.
#[derive(Debug, Clone)]
pub struct Site {
    /// The user-supplied URL once a scheme is attached; may carry a path.
    pub url: String,
    scheme: String,
    host: String,
    port: Option<u16>,
    audit_type: AuditType,
    grouping: Grouping,
    output_dir: PathBuf,
    started_at: DateTime<Utc>,
}

impl Site {
    /// Resolve a site from a bare domain or a full URL.
    ///
    /// An explicit scheme in the input is honored as-is. A bare domain is
    /// probed: one GET against `https://{domain}`, falling back to `http`
    /// when the request fails or returns a non-success status.
    pub async fn from_domain_or_url(domain_or_url: &str, options: SiteOptions) -> Result<Self> {
        let has_scheme =
            domain_or_url.starts_with("http://") || domain_or_url.starts_with("https://");

        let (url, parse_target) = if has_scheme {
            (domain_or_url.to_string(), domain_or_url.to_string())
        } else {
            let scheme = Self::probe_scheme(domain_or_url).await;
            let url = format!("{scheme}://{domain_or_url}");
            (url.clone(), url)
        };

        let parsed = Url::parse(&parse_target)
            .map_err(|e| AuditError::Crawl(arbor_scanner::CrawlError::InvalidUrl(e.to_string())))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| {
                AuditError::Crawl(arbor_scanner::CrawlError::InvalidUrl(format!(
                    "no host in {parse_target}"
                )))
            })?
            .to_string();

        Ok(Self {
            url,
            scheme: parsed.scheme().to_string(),
            host,
            port: parsed.port(),
            audit_type: options.audit_type,
            grouping: options.grouping,
            output_dir: options.output_dir,
            started_at: Utc::now(),
        })
    }

    async fn probe_scheme(domain: &str) -> &'static str {
        let probe_url = format!("https://{domain}");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build();

        let response = match client {
            Ok(client) => client.get(&probe_url).send().await,
            Err(e) => {
                debug!("Probe client build failed: {e}");
                return "http";
            }
        };

        match response {
            Ok(response) if response.status().is_success() => "https",
            Ok(response) => {
                debug!("Probe of {probe_url} returned {}", response.status());
                "http"
            }
            Err(e) => {
                debug!("Probe of {probe_url} failed: {e}");
                "http"
            }
        }
    }

    /// `scheme://host[:port]` with no trailing slash. Every discovered link
    /// is normalized and scope-checked against this string.
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Fully qualified domain name of the target.
    pub fn fqdn(&self) -> &str {
        &self.host
    }

    /// Filesystem-safe site label, e.g. `sub-domain-com`.
    pub fn slug(&self) -> String {
        self.host.replace('.', "-")
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn audit_type(&self) -> AuditType {
        self.audit_type
    }

    /// The audit-type filter may change between successive runs on the same
    /// site; everything else is fixed.
    pub fn set_audit_type(&mut self, audit_type: AuditType) {
        self.audit_type = audit_type;
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.output_dir.join(self.slug())
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.audit_dir().join("sitemap.txt")
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_in(dir: &Path) -> SiteOptions {
        SiteOptions {
            output_dir: dir.to_path_buf(),
            ..SiteOptions::default()
        }
    }

    #[tokio::test]
    async fn site_from_url_keeps_explicit_scheme() {
        let site = Site::from_domain_or_url("http://sub.domain.com/path?q=foo", SiteOptions::default())
            .await
            .unwrap();

        assert_eq!("http://sub.domain.com/path?q=foo", site.url);
        assert_eq!("http", site.scheme());
        assert_eq!("http://sub.domain.com", site.base_url());
        assert_eq!("sub.domain.com", site.fqdn());
        assert_eq!("sub-domain-com", site.slug());
    }

    #[tokio::test]
    async fn site_keeps_port_in_base_url_but_not_slug() {
        let site = Site::from_domain_or_url("http://localhost:3000/", SiteOptions::default())
            .await
            .unwrap();

        assert_eq!("http://localhost:3000", site.base_url());
        assert_eq!("localhost", site.fqdn());
        assert_eq!("localhost", site.slug());
    }

    #[tokio::test]
    async fn paths_live_under_the_configured_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::from_domain_or_url("https://sub.domain.com", options_in(dir.path()))
            .await
            .unwrap();

        assert_eq!(dir.path().join("sub-domain-com"), site.audit_dir());
        assert_eq!(
            dir.path().join("sub-domain-com").join("sitemap.txt"),
            site.sitemap_path()
        );
    }

    #[tokio::test]
    async fn audit_type_is_the_only_mutable_option() {
        let mut site = Site::from_domain_or_url("https://sub.domain.com", SiteOptions::default())
            .await
            .unwrap();

        assert_eq!(AuditType::All, site.audit_type());
        site.set_audit_type(AuditType::Design);
        assert_eq!(AuditType::Design, site.audit_type());
        assert_eq!("https://sub.domain.com", site.base_url());
    }

    #[tokio::test]
    async fn rejects_input_without_host() {
        let result = Site::from_domain_or_url("http://", SiteOptions::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn extra_slashes_after_scheme_parse_leniently() {
        // WHATWG parsing skips surplus slashes after a special scheme, so
        // the first path segment becomes the host.
        let site = Site::from_domain_or_url("http:///nohost", SiteOptions::default())
            .await
            .unwrap();

        assert_eq!("nohost", site.fqdn());
        assert_eq!("http://nohost", site.base_url());
    }
}
