//! A single audited page and its URL-path derived grouping keys.

use url::Url;

use crate::finding::Finding;

/// One URL belonging to a site's audit run, owning its findings.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub findings: Vec<Finding>,
    /// False when the evaluation capability failed for this page; the page
    /// then contributes zero findings and is reported as unaudited.
    pub audited: bool,
}

impl Page {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            findings: Vec::new(),
            audited: false,
        }
    }

    /// URL path with the leading slash and a single trailing slash stripped.
    pub fn path(&self) -> String {
        let parsed = Url::parse(&self.url);
        let raw = parsed.as_ref().map(|u| u.path()).unwrap_or("");

        let trimmed = raw.strip_prefix('/').unwrap_or(raw);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        trimmed.to_string()
    }

    /// Ancestor templates of this page, most specific first.
    ///
    /// `a/b/c` yields `["a/b/c", "a/b", "a"]`; the root path yields nothing.
    pub fn templates(&self) -> Vec<String> {
        let mut templates = Vec::new();
        let mut path = self.path();

        while !path.is_empty() {
            templates.push(path.clone());
            match path.rfind('/') {
                Some(idx) => path.truncate(idx),
                None => break,
            }
        }

        templates
    }

    /// The most specific template, when the page has a non-empty path.
    pub fn template(&self) -> Option<String> {
        self.templates().into_iter().next()
    }

    /// The second template, when the path has at least two segments.
    pub fn subtemplate(&self) -> Option<String> {
        self.templates().into_iter().nth(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_slashes_from_paths() {
        let cases = [
            ("https://sub.domain.com", ""),
            ("https://sub.domain.com/", ""),
            ("https://sub.domain.com/path", "path"),
            ("https://sub.domain.com/path/", "path"),
            ("https://sub.domain.com/path/subpath/", "path/subpath"),
        ];

        for (url, expected) in cases {
            assert_eq!(expected, Page::new(url).path(), "url: {url}");
        }
    }

    #[test]
    fn templates_are_most_specific_first() {
        let page = Page::new("https://sub.domain.com/path/subpath/subsubpath/index.html");

        assert_eq!(
            vec![
                "path/subpath/subsubpath/index.html",
                "path/subpath/subsubpath",
                "path/subpath",
                "path",
            ],
            page.templates()
        );
    }

    #[test]
    fn root_path_yields_no_templates() {
        let page = Page::new("https://sub.domain.com/");

        assert!(page.templates().is_empty());
        assert_eq!(None, page.template());
        assert_eq!(None, page.subtemplate());
    }

    #[test]
    fn template_is_the_first_entry() {
        let cases = [
            (
                "https://sub.domain.com/path/subpath/subsubpath/index.html",
                Some("path/subpath/subsubpath/index.html"),
            ),
            ("https://sub.domain.com/path/subpath/", Some("path/subpath")),
            ("https://sub.domain.com/path/", Some("path")),
            ("https://sub.domain.com/path", Some("path")),
            ("https://sub.domain.com/", None),
        ];

        for (url, expected) in cases {
            assert_eq!(
                expected.map(str::to_string),
                Page::new(url).template(),
                "url: {url}"
            );
        }
    }

    #[test]
    fn subtemplate_is_the_second_entry_or_none() {
        let cases = [
            (
                "https://sub.domain.com/path/subpath/subsubpath/index.html",
                Some("path/subpath/subsubpath"),
            ),
            ("https://sub.domain.com/path/subpath/", Some("path")),
            ("https://sub.domain.com/path/subpath", Some("path")),
            ("https://sub.domain.com/path/", None),
            ("https://sub.domain.com/", None),
        ];

        for (url, expected) in cases {
            assert_eq!(
                expected.map(str::to_string),
                Page::new(url).subtemplate(),
                "url: {url}"
            );
        }
    }
}
