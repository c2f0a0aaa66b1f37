//! File path validation: existence, entry type, extension, permissions.

use std::path::{Path, PathBuf};

use preflight_core::{Issue, IssueCode, ValidationResult};

/// Expected filesystem entry type for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    /// Must be a regular file.
    #[default]
    File,
    /// Must be a directory.
    Directory,
    /// Any entry type is acceptable.
    Any,
}

/// One file requirement to validate.
///
/// # Examples
///
/// ```
/// use preflight_checks::file::{EntryKind, FileRule};
///
/// let rule = FileRule::new("contract.wasm")
///     .with_kind(EntryKind::File)
///     .with_extensions(&["wasm"])
///     .readable();
/// assert!(rule.must_exist);
/// assert_eq!(rule.allowed_extensions, vec!["wasm"]);
/// ```
#[derive(Debug, Clone)]
pub struct FileRule {
    /// Path to check; relative paths resolve against the validator's base.
    pub path: String,
    /// Expected entry type.
    pub kind: EntryKind,
    /// Allowed extensions (without dot, case-insensitive); empty = any.
    pub allowed_extensions: Vec<String>,
    /// Require read permission.
    pub read: bool,
    /// Require write permission.
    pub write: bool,
    /// Require execute permission.
    pub execute: bool,
    /// Whether the path must exist at all (default true).
    pub must_exist: bool,
}

impl FileRule {
    /// Creates a rule for a path that must exist as a regular file.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: EntryKind::File,
            allowed_extensions: Vec::new(),
            read: false,
            write: false,
            execute: false,
            must_exist: true,
        }
    }

    /// Sets the expected entry type.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Restricts the allowed extensions (without dot, case-insensitive).
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.allowed_extensions = extensions.iter().map(|e| (*e).to_string()).collect();
        self
    }

    /// Requires read permission.
    pub fn readable(mut self) -> Self {
        self.read = true;
        self
    }

    /// Requires write permission.
    pub fn writable(mut self) -> Self {
        self.write = true;
        self
    }

    /// Requires execute permission.
    pub fn executable(mut self) -> Self {
        self.execute = true;
        self
    }

    /// Allows the path to be absent.
    pub fn optional(mut self) -> Self {
        self.must_exist = false;
        self
    }
}

/// Validates a single file rule.
///
/// An empty path yields only `EMPTY_PATH`; a missing path with `must_exist`
/// yields only `FILE_NOT_FOUND` — existence is a prerequisite for the type,
/// extension, and permission checks, which are skipped for that rule.
///
/// # Examples
///
/// ```no_run
/// use preflight_checks::file::{FileRule, validate_file_rule};
/// use preflight_core::IssueCode;
///
/// let result = validate_file_rule(&FileRule::new("missing.wasm"), None);
/// assert_eq!(result.issues.len(), 1);
/// assert_eq!(result.issues[0].code, IssueCode::FileNotFound);
/// ```
pub fn validate_file_rule(rule: &FileRule, base_dir: Option<&Path>) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if rule.path.trim().is_empty() {
        result.push(
            Issue::error(IssueCode::EmptyPath, "File path is empty")
                .with_suggestion("Provide a non-empty path"),
        );
        return result;
    }

    let resolved = resolve(&rule.path, base_dir);
    let metadata = match std::fs::metadata(&resolved) {
        Ok(metadata) => Some(metadata),
        Err(_) => None,
    };

    let Some(metadata) = metadata else {
        if rule.must_exist {
            result.push(
                Issue::error(
                    IssueCode::FileNotFound,
                    format!("File not found: {}", rule.path),
                )
                .with_field(rule.path.clone())
                .with_suggestion(format!(
                    "Check the path, or create {} before running",
                    rule.path
                )),
            );
        }
        return result;
    };

    match rule.kind {
        EntryKind::File if !metadata.is_file() => result.push(
            Issue::error(
                IssueCode::NotAFile,
                format!("Expected a regular file: {}", rule.path),
            )
            .with_field(rule.path.clone())
            .with_expected("regular file".to_string())
            .with_suggestion(format!("Point the rule at a file, not {}", rule.path)),
        ),
        EntryKind::Directory if !metadata.is_dir() => result.push(
            Issue::error(
                IssueCode::NotADirectory,
                format!("Expected a directory: {}", rule.path),
            )
            .with_field(rule.path.clone())
            .with_expected("directory".to_string())
            .with_suggestion(format!("Point the rule at a directory, not {}", rule.path)),
        ),
        _ => {}
    }

    check_extension(rule, &resolved, &mut result);
    check_permissions(rule, &resolved, &metadata, &mut result);

    result
}

/// Validates several independent rules, concatenating their issues.
pub fn validate_file_rules(rules: &[FileRule], base_dir: Option<&Path>) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for rule in rules {
        result.merge(validate_file_rule(rule, base_dir));
    }
    result
}

fn resolve(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match base_dir {
        Some(base) => base.join(path),
        None => path.to_path_buf(),
    }
}

fn check_extension(rule: &FileRule, resolved: &Path, result: &mut ValidationResult) {
    if rule.allowed_extensions.is_empty() {
        return;
    }
    let extension = resolved
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let allowed = rule
        .allowed_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&extension));
    if !allowed {
        let expected = rule.allowed_extensions.join(", ");
        result.push(
            Issue::error(
                IssueCode::InvalidFileExtension,
                format!("Unexpected extension on {}", rule.path),
            )
            .with_field(rule.path.clone())
            .with_received(extension)
            .with_expected(expected.clone())
            .with_suggestion(format!("Use a file with one of: {expected}")),
        );
    }
}

fn check_permissions(
    rule: &FileRule,
    resolved: &Path,
    metadata: &std::fs::Metadata,
    result: &mut ValidationResult,
) {
    for (wanted, name) in [
        (rule.read, "read"),
        (rule.write, "write"),
        (rule.execute, "execute"),
    ] {
        if wanted && !has_permission(resolved, metadata, name) {
            result.push(
                Issue::error(
                    IssueCode::InsufficientPermission,
                    format!("Missing {name} permission on {}", rule.path),
                )
                .with_field(rule.path.clone())
                .with_expected(format!("{name} access"))
                .with_suggestion(format!("Adjust permissions to grant {name} access")),
            );
        }
    }
}

#[cfg(unix)]
fn has_permission(_resolved: &Path, metadata: &std::fs::Metadata, name: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    // Owner/group/other bits all count; the probe runs as the invoking user
    // and a finer check would need an access(2) call.
    let mask = match name {
        "read" => 0o444,
        "write" => 0o222,
        "execute" => 0o111,
        _ => return true,
    };
    mode & mask != 0
}

#[cfg(not(unix))]
fn has_permission(_resolved: &Path, metadata: &std::fs::Metadata, name: &str) -> bool {
    match name {
        "write" => !metadata.permissions().readonly(),
        // Read and execute bits are not modeled off Unix.
        _ => true,
    }
}
