// Tests for sitemap and CSV persistence

use arbor_core::finding::{Finding, FindingCategory, FindingKind};
use arbor_core::report::{read_sitemap, write_sitemap, write_violations_csv};
use chrono::{TimeZone, Utc};

fn finding(page_url: &str, failure: Option<&str>) -> Finding {
    Finding {
        page_url: page_url.to_string(),
        source: "axe".to_string(),
        identifier: "color-contrast".to_string(),
        severity: "serious".to_string(),
        kind: FindingKind::Warning,
        category: FindingCategory::Design,
        help: "Elements must have sufficient color contrast".to_string(),
        help_url: "https://deque.example/color-contrast".to_string(),
        html: "<p class=\"dim\">text</p>".to_string(),
        failure: failure.map(str::to_string),
    }
}

#[test]
fn sitemap_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub-domain-com").join("sitemap.txt");
    let urls = vec![
        "https://sub.domain.com".to_string(),
        "https://sub.domain.com/about".to_string(),
        "https://sub.domain.com/docs/install".to_string(),
    ];
    let generated_at = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();

    write_sitemap(&path, "sub.domain.com", &urls, generated_at).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();

    assert!(contents.starts_with("#\n"));
    assert!(contents.contains("## Sitemap for sub.domain.com generated 2026-08-30 12:00:00"));

    assert_eq!(urls, read_sitemap(&path).unwrap());
}

#[test]
fn sitemap_reader_skips_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sitemap.txt");
    std::fs::write(
        &path,
        "# header\n\nhttps://sub.domain.com\n   \nhttps://sub.domain.com/a\n## trailing\n",
    )
    .unwrap();

    assert_eq!(
        vec![
            "https://sub.domain.com".to_string(),
            "https://sub.domain.com/a".to_string(),
        ],
        read_sitemap(&path).unwrap()
    );
}

#[test]
fn csv_has_header_and_one_row_per_finding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("violations.csv");
    let findings = [
        finding("https://sub.domain.com/a", Some("Contrast ratio is 2.1:1")),
        finding("https://sub.domain.com/b", None),
    ];
    let refs: Vec<&Finding> = findings.iter().collect();

    write_violations_csv(&path, &refs).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        vec![
            "page_url",
            "source",
            "identifier",
            "severity",
            "kind",
            "help",
            "help_url",
            "html",
            "failure",
        ],
        headers.iter().collect::<Vec<_>>()
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(2, rows.len());

    // The failure text sits in the final column.
    assert_eq!("Contrast ratio is 2.1:1", &rows[0][8]);
    assert_eq!("", &rows[1][8]);
    assert_eq!("https://sub.domain.com/a", &rows[0][0]);
    assert_eq!("warning", &rows[0][4]);
}

#[test]
fn csv_with_no_findings_still_has_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    write_violations_csv(&path, &[]).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(9, reader.headers().unwrap().len());
    assert_eq!(0, reader.records().count());
}
