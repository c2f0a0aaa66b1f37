//! Pipeline orchestration: stage sequencing, short-circuiting, reporting.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use preflight_checks::env::EnvSnapshot;
use preflight_checks::file::FileRule;
use preflight_checks::net::Endpoint;
use preflight_checks::suggest::closest_match;
use preflight_core::{CommandSchema, ParamType, SchemaRegistry, Version};

use crate::check::{CheckContext, CheckResult, CheckStatus, PreFlightCheck};
use crate::config::PreflightConfig;
use crate::report::PreFlightReport;
use crate::stages::default_stages;

/// Schema selection: by registered name, or an inline override.
pub enum SchemaRef {
    Name(String),
    Inline(CommandSchema),
}

/// Input to one pipeline run.
///
/// Defaults: short-circuit on, dry-run off, empty parameter/endpoint/rule
/// lists, default [`PreflightConfig`].
pub struct PreFlightOptions {
    pub schema: SchemaRef,
    pub parameters: BTreeMap<String, String>,
    pub cli_path: Option<PathBuf>,
    pub endpoints: Vec<Endpoint>,
    pub file_rules: Vec<FileRule>,
    pub env: EnvSnapshot,
    pub detected_cli_version: Option<Version>,
    pub base_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub short_circuit: bool,
    pub config: PreflightConfig,
    pub additional_checks: Vec<Box<dyn PreFlightCheck>>,
}

impl PreFlightOptions {
    /// Options for a command resolved by name from the registry.
    pub fn for_command(name: &str) -> Self {
        Self::new(SchemaRef::Name(name.to_string()))
    }

    /// Options for an inline schema override.
    pub fn for_schema(schema: CommandSchema) -> Self {
        Self::new(SchemaRef::Inline(schema))
    }

    fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            parameters: BTreeMap::new(),
            cli_path: None,
            endpoints: Vec::new(),
            file_rules: Vec::new(),
            env: EnvSnapshot::default(),
            detected_cli_version: None,
            base_dir: None,
            dry_run: false,
            short_circuit: true,
            config: PreflightConfig::default(),
            additional_checks: Vec::new(),
        }
    }

    /// Sets one supplied parameter value.
    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }

    /// Replaces the supplied parameter map.
    pub fn with_parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the resolved external CLI path.
    pub fn with_cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cli_path = Some(path.into());
        self
    }

    /// Adds an endpoint for the network stage.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Adds a file rule for the file stage.
    pub fn with_file_rule(mut self, rule: FileRule) -> Self {
        self.file_rules.push(rule);
        self
    }

    /// Sets the environment snapshot.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    /// Records the CLI version the caller probed.
    pub fn with_detected_cli_version(mut self, version: Version) -> Self {
        self.detected_cli_version = Some(version);
        self
    }

    /// Sets the base directory for relative path resolution.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Marks the run as a dry run.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Disables short-circuiting: every stage executes regardless of
    /// earlier failures.
    pub fn no_short_circuit(mut self) -> Self {
        self.short_circuit = false;
        self
    }

    /// Replaces the pipeline configuration.
    pub fn with_config(mut self, config: PreflightConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a caller-supplied check after the built-in stages.
    pub fn with_additional_check(mut self, check: Box<dyn PreFlightCheck>) -> Self {
        self.additional_checks.push(check);
        self
    }
}

/// The pipeline's only error path: everything after schema resolution is
/// reported as data inside the [`PreFlightReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown command: {name}")]
    UnknownCommand {
        name: String,
        /// Closest registered command, when one is within edit distance.
        suggestion: Option<String>,
    },
}

/// Runs the pre-flight pipeline and aggregates a report.
///
/// Stages execute strictly in order. Once any stage has failed and
/// short-circuit is enabled (the default), every later stage is recorded as
/// `skipped` without executing. A stage that panics is degraded to a failed
/// result carrying the panic text; the pipeline itself never propagates a
/// fault.
///
/// # Errors
///
/// [`PipelineError::UnknownCommand`] when `options.schema` names a command
/// the registry does not know.
pub fn run_preflight(
    options: PreFlightOptions,
    registry: &SchemaRegistry,
) -> Result<PreFlightReport, PipelineError> {
    let schema = match options.schema {
        SchemaRef::Inline(schema) => schema,
        SchemaRef::Name(ref name) => {
            registry
                .get(name)
                .cloned()
                .ok_or_else(|| PipelineError::UnknownCommand {
                    name: name.clone(),
                    suggestion: closest_match(name, &registry.command_names())
                        .map(str::to_string),
                })?
        }
    };

    let ctx = CheckContext {
        schema,
        parameters: options.parameters,
        cli_path: options.cli_path,
        endpoints: options.endpoints,
        file_rules: options.file_rules,
        env: options.env,
        detected_cli_version: options.detected_cli_version,
        base_dir: options.base_dir,
        config: options.config,
    };

    let mut checks = default_stages();
    checks.extend(options.additional_checks);

    info!(
        command = %ctx.schema.name,
        stages = checks.len(),
        short_circuit = options.short_circuit,
        "Running pre-flight checks"
    );

    let started = Instant::now();
    let mut results: Vec<CheckResult> = Vec::with_capacity(checks.len());
    let mut any_failed = false;

    for check in &checks {
        if any_failed && options.short_circuit {
            results.push(CheckResult::skipped(
                check.id(),
                check.label(),
                "Skipped due to previous failure",
            ));
            continue;
        }

        let stage_started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| check.execute(&ctx))).unwrap_or_else(
            |panic| {
                CheckResult::failed(
                    check.id(),
                    check.label(),
                    format!("Check panicked: {}", panic_text(panic.as_ref())),
                )
            },
        );
        let result = result.with_duration(stage_started.elapsed().as_millis() as u64);

        debug!(
            check = result.check_id.as_str(),
            status = ?result.status,
            duration_ms = result.duration_ms,
            "Stage finished"
        );

        if result.status == CheckStatus::Failed {
            any_failed = true;
        }
        results.push(result);
    }

    let report = PreFlightReport {
        passed: !any_failed,
        dry_run: options.dry_run,
        command: ctx.schema.name.clone(),
        resolved_command_line: resolve_command_line(&ctx),
        checks: results,
        total_duration_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().to_rfc3339(),
    };

    info!(
        command = %report.command,
        passed = report.passed,
        failed = report.failed_count(),
        total_ms = report.total_duration_ms,
        "Pre-flight checks finished"
    );

    Ok(report)
}

fn panic_text(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builds the command line the execution wrapper would run.
///
/// Positionals come first in schema order, then flags; absent values fall
/// back to schema defaults. Boolean flags render bare when truthy and are
/// omitted otherwise.
fn resolve_command_line(ctx: &CheckContext) -> String {
    let program = ctx
        .cli_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ctx.config.cli.program.clone());

    let mut parts = vec![program, ctx.schema.name.clone()];

    for param in &ctx.schema.positional {
        if let Some(value) = supplied_or_default(ctx, &param.name) {
            parts.push(quote(&value));
        }
    }

    for param in &ctx.schema.flags {
        let Some(value) = supplied_or_default(ctx, &param.name) else {
            continue;
        };
        if param.param_type == ParamType::Boolean {
            if matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes") {
                parts.push(param.name.clone());
            }
        } else {
            parts.push(param.name.clone());
            parts.push(quote(&value));
        }
    }

    parts.join(" ")
}

fn supplied_or_default(ctx: &CheckContext, name: &str) -> Option<String> {
    if let Some(value) = ctx.parameters.get(name) {
        if !value.trim().is_empty() {
            return Some(value.clone());
        }
    }
    for (alias, canonical) in &ctx.schema.aliases {
        if canonical == name {
            if let Some(value) = ctx.parameters.get(alias) {
                if !value.trim().is_empty() {
                    return Some(value.clone());
                }
            }
        }
    }
    ctx.schema
        .find_parameter(name)
        .and_then(|p| p.default_value.clone())
}

fn quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}
