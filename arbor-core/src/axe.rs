//! Raw axe-style evaluation output and the evaluator seam.
//!
//! Arbor does not implement accessibility rules. It consumes the JSON an
//! axe-compatible engine produces: a `violations` list of definitive
//! failures and an `incomplete` list of review items, each grouping one
//! rule across the DOM nodes it matched.

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::{AuditError, Result};

/// One matched DOM node inside a finding group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxeNode {
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub html: String,
    #[serde(rename = "failureSummary", default)]
    pub failure_summary: Option<String>,
}

/// One rule result: the rule id plus every node it matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxeGroup {
    pub id: String,
    #[serde(default)]
    pub help: String,
    #[serde(rename = "helpUrl", default)]
    pub help_url: String,
    #[serde(default)]
    pub nodes: Vec<AxeNode>,
}

/// The full evaluation output for one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxeResults {
    /// Definitive failures ("errors" in Arbor terms).
    #[serde(default)]
    pub violations: Vec<AxeGroup>,
    /// Review items the engine could not decide ("warnings").
    #[serde(default)]
    pub incomplete: Vec<AxeGroup>,
}

impl AxeResults {
    /// Parse engine output. The axe CLI wraps its result object in a
    /// one-element array, so both shapes are accepted.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if let Ok(results) = serde_json::from_slice::<AxeResults>(bytes) {
            return Ok(results);
        }
        let mut many: Vec<AxeResults> = serde_json::from_slice(bytes)?;
        Ok(many.drain(..).next().unwrap_or_default())
    }
}

/// The external accessibility evaluation capability.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, url: &str) -> impl Future<Output = Result<AxeResults>> + Send;
}

/// Evaluator that shells out to an axe-compatible command line program.
///
/// The configured command gets the page URL appended as its final argument
/// and must print axe JSON on stdout, e.g. `axe --stdout`.
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    pub fn new(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AuditError::Evaluate("empty evaluator command".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Evaluator for CommandEvaluator {
    async fn evaluate(&self, url: &str) -> Result<AxeResults> {
        debug!("Evaluating {} with {}", url, self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AuditError::Evaluate(format!(
                "{} exited with {} for {}",
                self.program, output.status, url
            )));
        }

        AxeResults::from_json(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result_object() {
        let json = br#"{
            "violations": [
                {"id": "image-alt", "help": "h", "helpUrl": "u",
                 "nodes": [{"impact": "critical", "html": "<img>"}]}
            ],
            "incomplete": []
        }"#;

        let results = AxeResults::from_json(json).unwrap();
        assert_eq!(1, results.violations.len());
        assert_eq!("image-alt", results.violations[0].id);
        assert_eq!(
            Some("critical"),
            results.violations[0].nodes[0].impact.as_deref()
        );
    }

    #[test]
    fn parses_cli_array_wrapper() {
        let json = br#"[{"violations": [], "incomplete": [
            {"id": "color-contrast", "nodes": [{"html": "<p>"}]}
        ]}]"#;

        let results = AxeResults::from_json(json).unwrap();
        assert!(results.violations.is_empty());
        assert_eq!(1, results.incomplete.len());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let results = AxeResults::from_json(b"{}").unwrap();
        assert!(results.violations.is_empty());
        assert!(results.incomplete.is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(AxeResults::from_json(b"not json").is_err());
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(CommandEvaluator::new("   ").is_err());
    }
}
