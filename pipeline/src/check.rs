//! Check contract: status, result, context, and the check trait.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use preflight_checks::env::EnvSnapshot;
use preflight_checks::file::FileRule;
use preflight_checks::net::Endpoint;
use preflight_core::{CommandSchema, Issue, ValidationResult, Version};

use crate::config::PreflightConfig;

/// Outcome status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Warning,
    Skipped,
}

/// One pipeline stage's recorded outcome.
///
/// # Examples
///
/// ```
/// use preflight_pipeline::check::{CheckResult, CheckStatus};
///
/// let result = CheckResult::skipped("network", "Network connectivity", "not required");
/// assert_eq!(result.status, CheckStatus::Skipped);
/// assert_eq!(result.message.as_deref(), Some("not required"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub label: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl CheckResult {
    pub fn passed(check_id: &str, label: &str) -> Self {
        Self::new(check_id, label, CheckStatus::Passed, None)
    }

    pub fn failed(check_id: &str, label: &str, message: impl Into<String>) -> Self {
        Self::new(check_id, label, CheckStatus::Failed, Some(message.into()))
    }

    pub fn warning(check_id: &str, label: &str, message: impl Into<String>) -> Self {
        Self::new(check_id, label, CheckStatus::Warning, Some(message.into()))
    }

    pub fn skipped(check_id: &str, label: &str, message: impl Into<String>) -> Self {
        Self::new(check_id, label, CheckStatus::Skipped, Some(message.into()))
    }

    fn new(check_id: &str, label: &str, status: CheckStatus, message: Option<String>) -> Self {
        Self {
            check_id: check_id.to_string(),
            label: label.to_string(),
            status,
            message,
            duration_ms: None,
            issues: Vec::new(),
        }
    }

    /// Builds a result from a validator's output: errors fail the stage,
    /// warnings alone demote it to `Warning`, a clean result passes.
    pub fn from_validation(check_id: &str, label: &str, result: ValidationResult) -> Self {
        let status = if !result.valid() {
            CheckStatus::Failed
        } else if result.warnings().next().is_some() {
            CheckStatus::Warning
        } else {
            CheckStatus::Passed
        };
        let message = match status {
            CheckStatus::Failed => {
                let count = result.errors().count();
                Some(format!("{count} issue(s) found"))
            }
            CheckStatus::Warning => Some("passed with warnings".to_string()),
            _ => None,
        };
        Self {
            check_id: check_id.to_string(),
            label: label.to_string(),
            status,
            message,
            duration_ms: None,
            issues: result.issues,
        }
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches issue details.
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    /// Records the measured execution time.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Read-only input shared by every stage of one pipeline run.
///
/// Stages receive the context by reference and return a value; there is no
/// shared mutable state between stages.
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Resolved command schema.
    pub schema: CommandSchema,
    /// Supplied parameter values, keyed by name or alias.
    pub parameters: BTreeMap<String, String>,
    /// Resolved path to the external CLI binary, when known.
    pub cli_path: Option<PathBuf>,
    /// Endpoints the network stage probes.
    pub endpoints: Vec<Endpoint>,
    /// File rules for this invocation.
    pub file_rules: Vec<FileRule>,
    /// Captured environment.
    pub env: EnvSnapshot,
    /// CLI version detected by the caller, if probed.
    pub detected_cli_version: Option<Version>,
    /// Base directory for relative path resolution.
    pub base_dir: Option<PathBuf>,
    /// Timeouts and network defaults.
    pub config: PreflightConfig,
}

/// One independently executable stage of the pipeline.
///
/// Implementations must not panic and must not return early through errors:
/// any internal fault degrades to a failed [`CheckResult`] carrying the
/// fault text. The runner additionally guards execution with
/// `catch_unwind` to hold the no-panic contract even against bugs.
pub trait PreFlightCheck {
    /// Stable machine identifier (e.g. `command-syntax`).
    fn id(&self) -> &str;
    /// Human label shown in the report.
    fn label(&self) -> &str;
    /// Runs the stage against the read-only context.
    fn execute(&self, ctx: &CheckContext) -> CheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use preflight_core::IssueCode;

    #[test]
    fn test_from_validation_maps_statuses() {
        let clean = CheckResult::from_validation("x", "X", ValidationResult::ok());
        assert_eq!(clean.status, CheckStatus::Passed);
        assert!(clean.message.is_none());

        let warned = CheckResult::from_validation(
            "x",
            "X",
            ValidationResult::from_issues(vec![Issue::warning(IssueCode::NetworkError, "w")]),
        );
        assert_eq!(warned.status, CheckStatus::Warning);

        let failed = CheckResult::from_validation(
            "x",
            "X",
            ValidationResult::from_issues(vec![
                Issue::error(IssueCode::MissingParameter, "e"),
                Issue::warning(IssueCode::NetworkError, "w"),
            ]),
        );
        assert_eq!(failed.status, CheckStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("1 issue(s) found"));
        assert_eq!(failed.issues.len(), 2);
    }

    #[test]
    fn test_serde_skips_empty_fields() {
        let result = CheckResult::passed("syntax", "Command syntax");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("message"));
        assert!(!json.contains("duration_ms"));
        assert!(!json.contains("issues"));
    }
}
