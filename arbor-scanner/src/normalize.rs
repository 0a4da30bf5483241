//! URL normalization and scope filtering.
//!
//! Every link discovered during a crawl passes through `normalize` to get
//! its canonical absolute form, then through `is_in_scope` to decide whether
//! it belongs to the site being audited. The canonical string is the dedup
//! key for the whole crawl, so normalization must be idempotent.

use url::Url;

/// Markers that flag a link as non-navigational (or pointing at a page
/// fragment rather than a page).
const INVALID_MARKERS: [&str; 5] = ["mailto:", "tel:", "fax:", "#", "javascript:"];

/// File extensions that never resolve to an HTML page. Mirrors the ignore
/// list used by common link extractors.
pub const IGNORED_EXTENSIONS: &[&str] = &[
    // archives
    ".7z", ".bz2", ".gz", ".rar", ".tar", ".xz", ".zip",
    // images
    ".bmp", ".gif", ".ico", ".jpeg", ".jpg", ".png", ".psd", ".svg", ".tif", ".tiff", ".webp",
    // audio
    ".aac", ".aiff", ".flac", ".m4a", ".mid", ".mp3", ".ogg", ".wav", ".wma",
    // video
    ".3gp", ".avi", ".flv", ".m4v", ".mkv", ".mov", ".mp4", ".mpeg", ".mpg", ".webm", ".wmv",
    // office documents
    ".doc", ".docx", ".odp", ".ods", ".odt", ".pps", ".ppt", ".pptx", ".xls", ".xlsx",
    // everything else that is not a page
    ".bin", ".css", ".dmg", ".exe", ".iso", ".js", ".pdf", ".rss",
];

/// Turn a raw href into a canonical absolute URL.
///
/// Absolute links pass through unchanged, except that `/` and the base URL
/// with a bare trailing slash both collapse to exactly the base URL so the
/// site root cannot appear under two spellings. Relative links are rooted
/// with a leading slash and resolved against the base with RFC 3986 join
/// semantics.
pub fn normalize(raw_link: &str, base_url: &str) -> String {
    if raw_link == "/" || raw_link == format!("{base_url}/") {
        return base_url.to_string();
    }

    let is_absolute = raw_link.starts_with("http://") || raw_link.starts_with("https://");
    if is_absolute {
        return raw_link.to_string();
    }

    let rooted = if raw_link.starts_with('/') {
        raw_link.to_string()
    } else {
        format!("/{raw_link}")
    };

    match Url::parse(base_url).and_then(|base| base.join(&rooted)) {
        Ok(resolved) => resolved.to_string(),
        // Unparseable base: hand back the rooted link and let the scope
        // filter reject it.
        Err(_) => rooted,
    }
}

/// True when `url` names an auditable page on the site rooted at `base_url`.
///
/// Non-navigational links, known non-HTML file extensions and anything not
/// prefixed by the base URL (other hosts, other subdomains, other schemes)
/// are out of scope. Out-of-scope links are not errors; callers drop them
/// silently.
pub fn is_in_scope(url: &str, base_url: &str) -> bool {
    if INVALID_MARKERS.iter().any(|marker| url.contains(marker)) {
        return false;
    }

    if IGNORED_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        return false;
    }

    url.starts_with(base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://sub.domain.com";

    #[test]
    fn normalizes_links_against_base() {
        let cases = [
            // raw link, expected canonical url
            ("http://sub.domain.com/", "http://sub.domain.com"),
            ("http://sub.domain.com", "http://sub.domain.com"),
            ("/", "http://sub.domain.com"),
            ("/foo", "http://sub.domain.com/foo"),
            ("foo", "http://sub.domain.com/foo"),
            ("foo/bar", "http://sub.domain.com/foo/bar"),
            ("https://google.com", "https://google.com"),
            ("https://google.com/", "https://google.com/"),
            ("http://localhost/", "http://localhost/"),
            ("http://localhost:3000/", "http://localhost:3000/"),
        ];

        for (raw, expected) in cases {
            assert_eq!(expected, normalize(raw, BASE), "raw link: {raw}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw_links = ["/", "/foo", "foo", "foo/bar", "http://sub.domain.com/", "baz?q=1"];

        for raw in raw_links {
            let once = normalize(raw, BASE);
            assert_eq!(once, normalize(&once, BASE), "raw link: {raw}");
        }
    }

    #[test]
    fn root_aliases_collapse_to_base() {
        assert_eq!(BASE, normalize("/", BASE));
        assert_eq!(BASE, normalize("http://sub.domain.com/", BASE));
    }

    #[test]
    fn scope_accepts_same_site_pages() {
        let base = "https://sub.domain.com";
        assert!(is_in_scope("https://sub.domain.com/", base));
        assert!(is_in_scope("https://sub.domain.com/foo", base));
        assert!(is_in_scope("https://sub.domain.com/foo?q=foo", base));
    }

    #[test]
    fn scope_rejects_foreign_and_non_page_urls() {
        let base = "https://sub.domain.com";
        let rejected = [
            "https://domain.com/",
            "foo/bar",
            "https://google.com",
            "https://google.com/",
            "https://sub.domain.com/mailto:anon@domain.com",
            "https://sub.domain.com/tel:555-555-5555",
            "https://sub.domain.com/fax:555-555-5555",
            "https://sub.domain.com/foo#header",
            "https://sub.domain.com/javascript: openMarker(1)",
            "https://sub.domain.com/foo.jpg",
            "https://sub.domain.com/foo.mp3",
            "https://sub.domain.com/foo.mov",
            "https://sub.domain.com/foo.pdf",
        ];

        for url in rejected {
            assert!(!is_in_scope(url, base), "url: {url}");
        }
    }
}
