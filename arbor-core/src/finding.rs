//! Typed findings and the raw-result classifier.

use serde::{Deserialize, Serialize};

use crate::axe::{AxeGroup, AxeResults};
use crate::error::{AuditError, Result};

/// Whether a finding is a definitive failure or a review item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Error,
    Warning,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::Error => "error",
            FindingKind::Warning => "warning",
        }
    }
}

/// Which discipline owns the fix. Color contrast is a design concern;
/// everything else an engine reports is a markup/code concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    Design,
    Code,
}

impl FindingCategory {
    /// Derived deterministically from the rule identifier, fixed for the
    /// lifetime of the finding.
    pub fn from_identifier(identifier: &str) -> Self {
        if identifier == "color-contrast" {
            FindingCategory::Design
        } else {
            FindingCategory::Code
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingCategory::Design => "design",
            FindingCategory::Code => "code",
        }
    }
}

/// Which findings an audit run keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditType {
    #[default]
    All,
    Design,
    Code,
}

impl AuditType {
    /// Parse the CLI value. Absent means unrestricted; anything other than
    /// `design` or `code` is a fatal configuration error, raised before any
    /// crawling begins.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(AuditType::All),
            Some("design") => Ok(AuditType::Design),
            Some("code") => Ok(AuditType::Code),
            Some(other) => Err(AuditError::InvalidAuditType(other.to_string())),
        }
    }

    pub fn includes(self, category: FindingCategory) -> bool {
        match self {
            AuditType::All => true,
            AuditType::Design => category == FindingCategory::Design,
            AuditType::Code => category == FindingCategory::Code,
        }
    }

    /// Label used in report file names.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditType::All => "all",
            AuditType::Design => "design",
            AuditType::Code => "code",
        }
    }
}

/// One accessibility concern on one page. Immutable once classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub page_url: String,
    /// Which evaluation engine reported it.
    pub source: String,
    /// Rule name, e.g. `image-alt`.
    pub identifier: String,
    /// Engine-supplied impact label, e.g. `critical`.
    pub severity: String,
    pub kind: FindingKind,
    pub category: FindingCategory,
    pub help: String,
    pub help_url: String,
    pub html: String,
    pub failure: Option<String>,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.kind == FindingKind::Error
    }

    pub fn is_warning(&self) -> bool {
        self.kind == FindingKind::Warning
    }
}

/// Classify one raw finding group into node-level findings.
///
/// The audit-type filter is applied per node-level finding rather than once
/// per group. A group's identifier is constant across its nodes today, but
/// filtering at node granularity keeps behavior unchanged if a future
/// finding source breaks that assumption.
pub fn classify_group(
    group: &AxeGroup,
    kind: FindingKind,
    page_url: &str,
    audit_type: AuditType,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for node in &group.nodes {
        let category = FindingCategory::from_identifier(&group.id);
        let finding = Finding {
            page_url: page_url.to_string(),
            source: "axe".to_string(),
            identifier: group.id.clone(),
            severity: node.impact.clone().unwrap_or_default(),
            kind,
            category,
            help: group.help.clone(),
            help_url: group.help_url.clone(),
            html: node.html.clone(),
            failure: node.failure_summary.clone(),
        };

        if audit_type.includes(finding.category) {
            findings.push(finding);
        }
    }

    findings
}

/// Classify a full evaluation result for one page: `violations` become
/// errors, `incomplete` entries become warnings.
pub fn classify_results(
    results: &AxeResults,
    page_url: &str,
    audit_type: AuditType,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for group in &results.violations {
        findings.extend(classify_group(group, FindingKind::Error, page_url, audit_type));
    }
    for group in &results.incomplete {
        findings.extend(classify_group(group, FindingKind::Warning, page_url, audit_type));
    }

    findings
}
