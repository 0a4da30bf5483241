//! Persisted outputs: the sitemap text file and the violations CSV.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::finding::Finding;

/// Column order is fixed; downstream tooling indexes by position.
const CSV_COLUMNS: [&str; 9] = [
    "page_url",
    "source",
    "identifier",
    "severity",
    "kind",
    "help",
    "help_url",
    "html",
    "failure",
];

/// Write the canonical sitemap: a `#` header comment naming the domain and
/// generation time, then one canonical URL per line.
pub fn write_sitemap(
    path: &Path,
    fqdn: &str,
    urls: &[String],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut contents = String::from("#\n");
    contents.push_str(&format!(
        "## Sitemap for {} generated {}\n",
        fqdn,
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    contents.push_str("###\n");
    for url in urls {
        contents.push_str(url);
        contents.push('\n');
    }

    fs::write(path, contents)?;
    Ok(())
}

/// Read a sitemap back, skipping blank lines and `#` comments.
pub fn read_sitemap(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Write the violations CSV: a header row, then exactly one row per
/// finding.
pub fn write_violations_csv(path: &Path, findings: &[&Finding]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_COLUMNS)?;

    for finding in findings {
        writer.write_record([
            finding.page_url.as_str(),
            finding.source.as_str(),
            finding.identifier.as_str(),
            finding.severity.as_str(),
            finding.kind.as_str(),
            finding.help.as_str(),
            finding.help_url.as_str(),
            finding.html.as_str(),
            finding.failure.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
