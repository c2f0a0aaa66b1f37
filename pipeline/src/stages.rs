//! Built-in pipeline stages.
//!
//! The closed set the default pipeline runs, in order: command syntax,
//! CLI availability, environment, file validation, network connectivity.
//! Caller-supplied checks append after these.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::debug;
use wait_timeout::ChildExt;

use preflight_checks::env::validate_environment;
use preflight_checks::file::validate_file_rules;
use preflight_checks::net::check_endpoints;
use preflight_checks::params::validate_parameters;
use preflight_checks::version::extract_version;
use preflight_core::{Issue, IssueCode};

use crate::check::{CheckContext, CheckResult, PreFlightCheck};

/// Validates supplied parameters against the resolved schema.
pub struct SyntaxCheck;

impl PreFlightCheck for SyntaxCheck {
    fn id(&self) -> &str {
        "command-syntax"
    }

    fn label(&self) -> &str {
        "Command syntax"
    }

    fn execute(&self, ctx: &CheckContext) -> CheckResult {
        let result = validate_parameters(&ctx.schema, &ctx.parameters);
        CheckResult::from_validation(self.id(), self.label(), result)
    }
}

/// Probes the external CLI binary with `--version` under a hard timeout.
pub struct CliAvailabilityCheck;

impl PreFlightCheck for CliAvailabilityCheck {
    fn id(&self) -> &str {
        "cli-availability"
    }

    fn label(&self) -> &str {
        "CLI availability"
    }

    fn execute(&self, ctx: &CheckContext) -> CheckResult {
        if !ctx.schema.requires_cli {
            return CheckResult::skipped(
                self.id(),
                self.label(),
                "Command does not use the external CLI",
            );
        }

        let program = ctx
            .cli_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&ctx.config.cli.program));

        debug!(program = %program.display(), "Probing CLI availability");

        let spawned = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                let issue = Issue::error(
                    IssueCode::CliNotFound,
                    format!("CLI binary not found: {}", program.display()),
                )
                .with_received(program.display().to_string())
                .with_suggestion(
                    "Install the CLI or point --cli-path at the binary".to_string(),
                );
                return CheckResult::failed(self.id(), self.label(), "CLI binary not found")
                    .with_issues(vec![issue]);
            }
            Err(error) => {
                return CheckResult::failed(
                    self.id(),
                    self.label(),
                    format!("Failed to start {}: {error}", program.display()),
                );
            }
        };

        let started = Instant::now();
        let timeout = ctx.config.cli_timeout();
        match child.wait_timeout(timeout) {
            Ok(Some(_status)) => {
                // Any exit within the timeout proves the binary is present
                // and responsive; the banner feeds the version display.
                let mut banner = String::new();
                if let Some(ref mut stdout) = child.stdout {
                    let _ = stdout.read_to_string(&mut banner);
                }
                if banner.trim().is_empty() {
                    if let Some(ref mut stderr) = child.stderr {
                        let _ = stderr.read_to_string(&mut banner);
                    }
                }

                let elapsed = started.elapsed().as_millis();
                let message = match extract_version(&banner) {
                    Some(version) => format!("CLI version {version} responded in {elapsed}ms"),
                    None => format!("CLI responded in {elapsed}ms"),
                };
                CheckResult::passed(self.id(), self.label()).with_message(message)
            }
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                let issue = Issue::error(
                    IssueCode::CliTimeout,
                    format!(
                        "CLI did not respond within {}ms: {}",
                        timeout.as_millis(),
                        program.display()
                    ),
                )
                .with_suggestion(
                    "The binary may be hung or very slow; raise cli.timeout_ms if this is expected"
                        .to_string(),
                );
                CheckResult::failed(self.id(), self.label(), "CLI probe timed out")
                    .with_issues(vec![issue])
            }
            Err(error) => {
                let _ = child.kill();
                let _ = child.wait();
                CheckResult::failed(
                    self.id(),
                    self.label(),
                    format!("Failed waiting on CLI probe: {error}"),
                )
            }
        }
    }
}

/// Validates environment variables, config files, and the CLI version gate.
pub struct EnvironmentCheck;

impl PreFlightCheck for EnvironmentCheck {
    fn id(&self) -> &str {
        "environment"
    }

    fn label(&self) -> &str {
        "Environment"
    }

    fn execute(&self, ctx: &CheckContext) -> CheckResult {
        let result = validate_environment(
            &ctx.env,
            &ctx.schema.required_env_vars,
            &ctx.schema.required_config_files,
            ctx.schema.min_cli_version,
            ctx.detected_cli_version,
            ctx.base_dir.as_deref(),
        );
        CheckResult::from_validation(self.id(), self.label(), result)
    }
}

/// Validates the invocation's file rules.
pub struct FileCheck;

impl PreFlightCheck for FileCheck {
    fn id(&self) -> &str {
        "file-validation"
    }

    fn label(&self) -> &str {
        "File validation"
    }

    fn execute(&self, ctx: &CheckContext) -> CheckResult {
        if ctx.file_rules.is_empty() {
            return CheckResult::skipped(
                self.id(),
                self.label(),
                "No file rules for this invocation",
            );
        }
        let result = validate_file_rules(&ctx.file_rules, ctx.base_dir.as_deref());
        CheckResult::from_validation(self.id(), self.label(), result)
    }
}

/// Probes the configured endpoints for reachability.
pub struct NetworkCheck;

impl PreFlightCheck for NetworkCheck {
    fn id(&self) -> &str {
        "network-connectivity"
    }

    fn label(&self) -> &str {
        "Network connectivity"
    }

    fn execute(&self, ctx: &CheckContext) -> CheckResult {
        if !ctx.schema.requires_network {
            return CheckResult::skipped(
                self.id(),
                self.label(),
                "Command does not require network access",
            );
        }
        if ctx.endpoints.is_empty() {
            return CheckResult::skipped(self.id(), self.label(), "No endpoints to probe");
        }
        let result = check_endpoints(&ctx.endpoints, ctx.config.network_timeout());
        CheckResult::from_validation(self.id(), self.label(), result)
    }
}

/// The default stage list in pipeline order.
pub fn default_stages() -> Vec<Box<dyn PreFlightCheck>> {
    vec![
        Box::new(SyntaxCheck),
        Box::new(CliAvailabilityCheck),
        Box::new(EnvironmentCheck),
        Box::new(FileCheck),
        Box::new(NetworkCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckStatus;
    use crate::config::PreflightConfig;
    use preflight_checks::env::EnvSnapshot;
    use preflight_core::CommandSchema;
    use std::collections::BTreeMap;

    fn context_for(schema: CommandSchema) -> CheckContext {
        CheckContext {
            schema,
            parameters: BTreeMap::new(),
            cli_path: None,
            endpoints: Vec::new(),
            file_rules: Vec::new(),
            env: EnvSnapshot::default(),
            detected_cli_version: None,
            base_dir: None,
            config: PreflightConfig::default(),
        }
    }

    #[test]
    fn test_cli_check_skipped_when_not_required() {
        let ctx = context_for(CommandSchema::new("build", "Build"));
        let result = CliAvailabilityCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Skipped);
    }

    #[test]
    fn test_cli_check_reports_missing_binary() {
        let mut ctx = context_for(CommandSchema::new("deploy", "Deploy").needs_cli());
        ctx.cli_path = Some(PathBuf::from("/definitely/not/a/binary"));

        let result = CliAvailabilityCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.issues[0].code, IssueCode::CliNotFound);
    }

    #[test]
    fn test_cli_check_accepts_responsive_binary() {
        // `true` exits immediately with no banner; still counts as available.
        let mut ctx = context_for(CommandSchema::new("deploy", "Deploy").needs_cli());
        ctx.cli_path = Some(PathBuf::from("/bin/true"));

        let result = CliAvailabilityCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_network_check_skipped_without_requirement() {
        let ctx = context_for(CommandSchema::new("build", "Build"));
        let result = NetworkCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Skipped);
    }

    #[test]
    fn test_network_check_skipped_without_endpoints() {
        let ctx = context_for(CommandSchema::new("deploy", "Deploy").needs_network());
        let result = NetworkCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Skipped);
        assert_eq!(result.message.as_deref(), Some("No endpoints to probe"));
    }

    #[test]
    fn test_file_check_skipped_without_rules() {
        let ctx = context_for(CommandSchema::new("deploy", "Deploy"));
        let result = FileCheck.execute(&ctx);
        assert_eq!(result.status, CheckStatus::Skipped);
    }

    #[test]
    fn test_default_stage_order() {
        let ids: Vec<_> = default_stages().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "command-syntax",
                "cli-availability",
                "environment",
                "file-validation",
                "network-connectivity",
            ]
        );
    }
}
