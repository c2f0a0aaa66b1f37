//! Pre-flight report model and text rendering.
//!
//! The text rendering is the de facto wire format to the display layer:
//! line order is stable, a check's own message appears only when its status
//! is not `passed`, and each issue may carry one indented `→ suggestion`
//! line.

use serde::{Deserialize, Serialize};

use preflight_core::Severity;

use crate::check::{CheckResult, CheckStatus};

const RULE_WIDTH: usize = 46;

/// Final output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreFlightReport {
    /// `true` iff no check has status `failed`.
    pub passed: bool,
    /// Whether this run was a dry run.
    pub dry_run: bool,
    /// Command the run validated.
    pub command: String,
    /// Check outcomes in execution order, including skipped stages.
    pub checks: Vec<CheckResult>,
    /// Wall time of the whole run.
    pub total_duration_ms: u64,
    /// Command line that would execute.
    pub resolved_command_line: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl PreFlightReport {
    /// Number of checks with status `failed`.
    pub fn failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Failed)
            .count()
    }

    /// Renders the deterministic line-oriented text form.
    ///
    /// # Examples
    ///
    /// ```
    /// use preflight_pipeline::check::CheckResult;
    /// use preflight_pipeline::report::PreFlightReport;
    ///
    /// let report = PreFlightReport {
    ///     passed: true,
    ///     dry_run: false,
    ///     command: "build".to_string(),
    ///     checks: vec![CheckResult::passed("command-syntax", "Command syntax")],
    ///     total_duration_ms: 3,
    ///     resolved_command_line: "stellar build".to_string(),
    ///     timestamp: "2026-01-01T00:00:00Z".to_string(),
    /// };
    ///
    /// let text = report.render();
    /// assert!(text.starts_with("Pre-Flight Report: build\n"));
    /// assert!(text.contains("✓ Command syntax"));
    /// assert!(text.contains("All checks passed"));
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "─".repeat(RULE_WIDTH);

        out.push_str(&format!("Pre-Flight Report: {}\n", self.command));
        out.push_str(&rule);
        out.push('\n');

        for check in &self.checks {
            out.push_str(&format!("{} {}", status_icon(check.status), check.label));
            if let Some(duration) = check.duration_ms {
                out.push_str(&format!(" ({duration}ms)"));
            }
            out.push('\n');

            if check.status != CheckStatus::Passed {
                if let Some(message) = &check.message {
                    out.push_str(&format!("    {message}\n"));
                }
            }

            for issue in &check.issues {
                out.push_str(&format!(
                    "    {} {}\n",
                    severity_icon(issue.severity),
                    issue.message
                ));
                if let Some(suggestion) = &issue.suggestion {
                    out.push_str(&format!("      → {suggestion}\n"));
                }
            }
        }

        out.push_str(&rule);
        out.push('\n');

        if self.passed {
            out.push_str("All checks passed\n");
            if self.dry_run {
                out.push_str(&format!("Would execute: {}\n", self.resolved_command_line));
            }
        } else {
            out.push_str(&format!("{} check(s) failed\n", self.failed_count()));
        }

        out
    }
}

fn status_icon(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Passed => "✓",
        CheckStatus::Failed => "✗",
        CheckStatus::Warning => "⚠",
        CheckStatus::Skipped => "○",
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preflight_core::{Issue, IssueCode};

    fn report_with(checks: Vec<CheckResult>, passed: bool, dry_run: bool) -> PreFlightReport {
        PreFlightReport {
            passed,
            dry_run,
            command: "deploy".to_string(),
            checks,
            total_duration_ms: 42,
            resolved_command_line: "stellar deploy contract.wasm --network testnet".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_render_failure_with_issue_and_suggestion() {
        let failing = CheckResult::failed("environment", "Environment", "1 issue(s) found")
            .with_issues(vec![
                Issue::error(IssueCode::MissingEnvVar, "Environment variable X is not set")
                    .with_suggestion("Export X before running this command"),
            ])
            .with_duration(7);
        let skipped = CheckResult::skipped(
            "network-connectivity",
            "Network connectivity",
            "Skipped due to previous failure",
        );

        let text = report_with(vec![failing, skipped], false, false).render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Pre-Flight Report: deploy");
        assert!(lines[1].chars().all(|c| c == '─'));
        assert_eq!(lines[2], "✗ Environment (7ms)");
        assert_eq!(lines[3], "    1 issue(s) found");
        assert_eq!(lines[4], "    ✗ Environment variable X is not set");
        assert_eq!(lines[5], "      → Export X before running this command");
        assert_eq!(lines[6], "○ Network connectivity");
        assert_eq!(lines[7], "    Skipped due to previous failure");
        assert_eq!(lines[9], "1 check(s) failed");
    }

    #[test]
    fn test_passed_check_message_suppressed() {
        let passed =
            CheckResult::passed("cli-availability", "CLI availability").with_message("CLI version 21.0.0");
        let text = report_with(vec![passed], true, false).render();
        assert!(!text.contains("CLI version 21.0.0"));
        assert!(text.contains("✓ CLI availability"));
    }

    #[test]
    fn test_dry_run_success_appends_command_line() {
        let text = report_with(
            vec![CheckResult::passed("command-syntax", "Command syntax")],
            true,
            true,
        )
        .render();
        assert!(
            text.ends_with("Would execute: stellar deploy contract.wasm --network testnet\n")
        );
    }

    #[test]
    fn test_dry_run_failure_omits_command_line() {
        let text = report_with(
            vec![CheckResult::failed("command-syntax", "Command syntax", "bad")],
            false,
            true,
        )
        .render();
        assert!(!text.contains("Would execute"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = report_with(
            vec![CheckResult::passed("command-syntax", "Command syntax")],
            true,
            false,
        );
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"passed\":true"));
        assert!(json.contains("\"command\":\"deploy\""));
    }
}
