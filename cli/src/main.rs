//! `preflight` — run pre-flight validation before invoking the external CLI.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command as ProcessCommand, Stdio};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use preflight_checks::env::EnvSnapshot;
use preflight_checks::file::{EntryKind, FileRule};
use preflight_checks::net::Endpoint;
use preflight_checks::version::extract_version;
use preflight_core::{SchemaRegistry, Version};
use preflight_pipeline::config::PreflightConfig;
use preflight_pipeline::runner::{PipelineError, PreFlightOptions, run_preflight};

/// Output format for reports and schema listings.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "preflight")]
#[command(about = "Pre-flight validation for CLI command invocations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the pre-flight checks for a command invocation.
    Check(CheckArgs),
    /// List the registered command schemas.
    Schemas(SchemasArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Command to validate (e.g. deploy, build, invoke).
    command: String,
    /// Parameter value as KEY=VALUE (repeatable). Keys may be positional
    /// names, flag names, or registered aliases.
    #[arg(long = "param", value_name = "KEY=VALUE", allow_hyphen_values = true)]
    params: Vec<String>,
    /// Path to the external CLI binary.
    #[arg(long)]
    cli_path: Option<PathBuf>,
    /// Named network whose default RPC endpoint should be probed.
    #[arg(long)]
    network: Option<String>,
    /// Explicit RPC endpoint to probe (repeatable).
    #[arg(long = "rpc-url", value_name = "URL")]
    rpc_urls: Vec<String>,
    /// File rule as PATH[:KIND[:EXT,...]] with KIND one of file|dir|any
    /// (repeatable).
    #[arg(long = "file", value_name = "RULE")]
    files: Vec<String>,
    /// Base directory for relative path resolution.
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Report what would run without marking the run as an execution.
    #[arg(long)]
    dry_run: bool,
    /// Execute every stage even after a failure.
    #[arg(long)]
    no_short_circuit: bool,
    /// Pipeline configuration file (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct SchemasArgs {
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = SchemaRegistry::builtin();

    let code = match cli.command {
        Command::Check(args) => run_check(args, &registry),
        Command::Schemas(args) => run_schemas(&args, &registry),
    };
    std::process::exit(code);
}

fn run_check(args: CheckArgs, registry: &SchemaRegistry) -> i32 {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };

    let mut options = PreFlightOptions::for_command(&args.command)
        .with_env(EnvSnapshot::from_process())
        .with_config(config.clone());

    for pair in &args.params {
        let Some((key, value)) = pair.split_once('=') else {
            eprintln!("error: --param expects KEY=VALUE, got {pair:?}");
            return 2;
        };
        options = options.with_parameter(key, value);
    }

    if let Some(network) = &args.network {
        options = options.with_parameter("--network", network);
        match config.resolve_network(network) {
            Some(url) => {
                options = options.with_endpoint(Endpoint::new(&format!("{network} RPC"), url));
            }
            None => warn!(network = network.as_str(), "No default endpoint for network"),
        }
    }
    for url in &args.rpc_urls {
        options = options.with_endpoint(Endpoint::new("RPC", url));
    }

    for spec in &args.files {
        match parse_file_rule(spec) {
            Ok(rule) => options = options.with_file_rule(rule),
            Err(message) => {
                eprintln!("error: {message}");
                return 2;
            }
        }
    }

    if let Some(path) = &args.cli_path {
        options = options.with_cli_path(path.clone());
    }
    if let Some(dir) = &args.base_dir {
        options = options.with_base_dir(dir.clone());
    }
    if args.dry_run {
        options = options.dry_run();
    }
    if args.no_short_circuit {
        options = options.no_short_circuit();
    }

    // Probe the CLI version up front so the environment stage can gate on
    // it; stages themselves stay stateless.
    if let Some(schema) = registry.get(&args.command) {
        if schema.requires_cli {
            let program = args
                .cli_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.cli.program));
            if let Some(version) = probe_cli_version(&program, config.cli_timeout()) {
                options = options.with_detected_cli_version(version);
            }
        }
    }

    let report = match run_preflight(options, registry) {
        Ok(report) => report,
        Err(PipelineError::UnknownCommand { name, suggestion }) => {
            match suggestion {
                Some(suggestion) => {
                    eprintln!("error: unknown command {name:?} (did you mean {suggestion}?)");
                }
                None => eprintln!("error: unknown command {name:?}"),
            }
            return 2;
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", report.render()),
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(error) => {
                eprintln!("error: failed to serialize report: {error}");
                return 2;
            }
        },
    }

    i32::from(!report.passed)
}

fn run_schemas(args: &SchemasArgs, registry: &SchemaRegistry) -> i32 {
    match args.format {
        OutputFormat::Text => {
            for schema in registry.schemas() {
                println!("{:<10} {}", schema.name, schema.description);
                println!("{:<10} usage: {}", "", schema.usage);
            }
            0
        }
        OutputFormat::Json => {
            let schemas: Vec<_> = registry.schemas().collect();
            match serde_json::to_string_pretty(&schemas) {
                Ok(json) => {
                    println!("{json}");
                    0
                }
                Err(error) => {
                    eprintln!("error: failed to serialize schemas: {error}");
                    2
                }
            }
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<PreflightConfig, String> {
    match path {
        Some(path) => PreflightConfig::load(path)
            .map_err(|e| format!("cannot load config {}: {e}", path.display())),
        None => Ok(PreflightConfig::default()),
    }
}

/// Parses `PATH[:KIND[:EXT,...]]` into a [`FileRule`].
fn parse_file_rule(spec: &str) -> Result<FileRule, String> {
    let mut parts = spec.splitn(3, ':');
    let path = parts.next().unwrap_or_default();
    if path.is_empty() {
        return Err(format!("--file expects PATH[:KIND[:EXT,...]], got {spec:?}"));
    }

    let mut rule = FileRule::new(path);
    if let Some(kind) = parts.next() {
        rule = rule.with_kind(match kind {
            "file" | "" => EntryKind::File,
            "dir" | "directory" => EntryKind::Directory,
            "any" => EntryKind::Any,
            other => {
                return Err(format!(
                    "unknown file rule kind {other:?} (expected file, dir, or any)"
                ));
            }
        });
    }
    if let Some(extensions) = parts.next() {
        let extensions: Vec<&str> = extensions.split(',').filter(|e| !e.is_empty()).collect();
        if !extensions.is_empty() {
            rule = rule.with_extensions(&extensions);
        }
    }
    Ok(rule)
}

/// Probes `<program> --version` and extracts the banner version.
fn probe_cli_version(program: &std::path::Path, timeout: Duration) -> Option<Version> {
    let mut child = ProcessCommand::new(program)
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    match child.wait_timeout(timeout) {
        Ok(Some(_status)) => {
            let mut banner = String::new();
            if let Some(ref mut stdout) = child.stdout {
                let _ = stdout.read_to_string(&mut banner);
            }
            let version = extract_version(&banner);
            debug!(program = %program.display(), ?version, "Probed CLI version");
            version
        }
        _ => {
            let _ = child.kill();
            let _ = child.wait();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_rule_variants() {
        let plain = parse_file_rule("contract.wasm").unwrap();
        assert_eq!(plain.path, "contract.wasm");
        assert_eq!(plain.kind, EntryKind::File);
        assert!(plain.allowed_extensions.is_empty());

        let with_kind = parse_file_rule("out:dir").unwrap();
        assert_eq!(with_kind.kind, EntryKind::Directory);

        let full = parse_file_rule("contract.wasm:file:wasm,so").unwrap();
        assert_eq!(full.allowed_extensions, vec!["wasm", "so"]);
    }

    #[test]
    fn test_parse_file_rule_rejects_bad_kind() {
        assert!(parse_file_rule("x:link").is_err());
        assert!(parse_file_rule("").is_err());
    }

    #[test]
    fn test_cli_parses_check_invocation() {
        let cli = Cli::try_parse_from([
            "preflight",
            "check",
            "deploy",
            "--param",
            "--network=testnet",
            "--param",
            "--source=dev",
            "--dry-run",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.command, "deploy");
                assert_eq!(args.params.len(), 2);
                assert!(args.dry_run);
            }
            _ => panic!("expected check subcommand"),
        }
    }
}
