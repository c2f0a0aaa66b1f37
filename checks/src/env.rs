//! Environment validation: variables, config files, CLI version.
//!
//! The validator is a pure function of its inputs: it reads an
//! [`EnvSnapshot`] the caller captured rather than the ambient process
//! environment, so tests can validate arbitrary environments without
//! mutating process state.

use std::collections::BTreeMap;
use std::path::Path;

use preflight_core::{Issue, IssueCode, ValidationResult, Version};

/// Captured set of environment variables.
///
/// # Examples
///
/// ```
/// use preflight_checks::env::EnvSnapshot;
///
/// let snapshot = EnvSnapshot::from_pairs([("STELLAR_ACCOUNT", "dev")]);
/// assert_eq!(snapshot.get("STELLAR_ACCOUNT"), Some("dev"));
/// assert_eq!(snapshot.get("MISSING"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Builds a snapshot from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Looks up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Validates the runtime environment against a command's requirements.
///
/// All checks run unconditionally; there is no short-circuit inside this
/// validator. Relative config-file paths resolve against `base_dir`
/// (falling back to the process working directory).
///
/// # Examples
///
/// ```
/// use preflight_checks::env::{EnvSnapshot, validate_environment};
/// use preflight_core::IssueCode;
///
/// let snapshot = EnvSnapshot::from_pairs([("HOME", "/home/dev")]);
/// let result = validate_environment(
///     &snapshot,
///     &["STELLAR_ACCOUNT".to_string()],
///     &[],
///     None,
///     None,
///     None,
/// );
/// assert_eq!(result.issues[0].code, IssueCode::MissingEnvVar);
/// ```
pub fn validate_environment(
    env: &EnvSnapshot,
    required_vars: &[String],
    required_config_files: &[String],
    min_cli_version: Option<u32>,
    detected_cli_version: Option<Version>,
    base_dir: Option<&Path>,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for name in required_vars {
        let blank = env.get(name).is_none_or(|v| v.trim().is_empty());
        if blank {
            result.push(
                Issue::error(
                    IssueCode::MissingEnvVar,
                    format!("Environment variable {name} is not set"),
                )
                .with_field(name.clone())
                .with_suggestion(format!("Export {name} before running this command")),
            );
        }
    }

    for file in required_config_files {
        check_config_file(file, base_dir, &mut result);
    }

    if let Some(minimum) = min_cli_version {
        check_cli_version(minimum, detected_cli_version, &mut result);
    }

    result
}

fn check_config_file(file: &str, base_dir: Option<&Path>, result: &mut ValidationResult) {
    let path = Path::new(file);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir
            .map(|dir| dir.join(path))
            .unwrap_or_else(|| path.to_path_buf())
    };

    match std::fs::metadata(&resolved) {
        Err(_) => result.push(
            Issue::error(
                IssueCode::MissingConfigFile,
                format!("Required config file not found: {file}"),
            )
            .with_field(file.to_string())
            .with_suggestion(format!("Create {file} or run the init command first")),
        ),
        Ok(meta) if !meta.is_file() => result.push(
            Issue::error(
                IssueCode::InvalidConfigFile,
                format!("Config path exists but is not a regular file: {file}"),
            )
            .with_field(file.to_string())
            .with_received("directory or special file".to_string())
            .with_expected("regular file".to_string())
            .with_suggestion(format!("Replace {file} with a regular file")),
        ),
        Ok(_) => {}
    }
}

fn check_cli_version(
    minimum: u32,
    detected: Option<Version>,
    result: &mut ValidationResult,
) {
    match detected {
        Some(version) if version.major < minimum => result.push(
            Issue::error(
                IssueCode::UnsupportedCliVersion,
                format!("CLI version {version} is below the required major version {minimum}"),
            )
            .with_received(version.to_string())
            .with_expected(format!(">= {minimum}.0.0"))
            .with_suggestion("Upgrade the CLI to a supported release".to_string()),
        ),
        Some(_) => {}
        None => result.push(
            Issue::warning(
                IssueCode::UnsupportedCliVersion,
                "CLI version could not be determined".to_string(),
            )
            .with_expected(format!(">= {minimum}.0.0"))
            .with_suggestion(
                "Run the CLI with --version manually to confirm it meets the minimum".to_string(),
            ),
        ),
    }
}
