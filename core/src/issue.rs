//! Issue and validation-result model.
//!
//! Every failure mode in this workspace is data: validators report
//! [`Issue`]s inside a [`ValidationResult`] and never return errors or
//! panic. An issue pairs a coarse [`Severity`] with a fine-grained
//! machine-readable [`IssueCode`] and, wherever the user can act, an
//! actionable suggestion.

use serde::{Deserialize, Serialize};

/// Coarse severity of an issue.
///
/// `Error` blocks execution; `Warning` is surfaced but does not block;
/// `Info` is purely advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Machine-readable failure class.
///
/// Serialized in SCREAMING_SNAKE_CASE; `Display` matches the serialized
/// form so log lines and JSON agree.
///
/// # Examples
///
/// ```
/// use preflight_core::IssueCode;
///
/// assert_eq!(IssueCode::UnknownFlag.to_string(), "UNKNOWN_FLAG");
/// let json = serde_json::to_string(&IssueCode::ConnectionRefused).unwrap();
/// assert_eq!(json, "\"CONNECTION_REFUSED\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Parameter validation
    UnknownFlag,
    MissingParameter,
    InvalidType,
    OutOfRange,
    InvalidBoolean,
    InvalidEnumValue,
    InvalidFormat,
    MutuallyExclusive,
    MissingDependency,
    // Environment validation
    MissingEnvVar,
    MissingConfigFile,
    InvalidConfigFile,
    UnsupportedCliVersion,
    // File validation
    EmptyPath,
    FileNotFound,
    NotAFile,
    NotADirectory,
    InvalidFileExtension,
    InsufficientPermission,
    // Network validation
    InvalidUrl,
    NetworkTimeout,
    ConnectionRefused,
    DnsResolutionFailed,
    ConnectionReset,
    TlsError,
    NetworkError,
    // CLI availability
    CliNotFound,
    CliTimeout,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::UnknownFlag => "UNKNOWN_FLAG",
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::InvalidType => "INVALID_TYPE",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::InvalidBoolean => "INVALID_BOOLEAN",
            Self::InvalidEnumValue => "INVALID_ENUM_VALUE",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::MutuallyExclusive => "MUTUALLY_EXCLUSIVE",
            Self::MissingDependency => "MISSING_DEPENDENCY",
            Self::MissingEnvVar => "MISSING_ENV_VAR",
            Self::MissingConfigFile => "MISSING_CONFIG_FILE",
            Self::InvalidConfigFile => "INVALID_CONFIG_FILE",
            Self::UnsupportedCliVersion => "UNSUPPORTED_CLI_VERSION",
            Self::EmptyPath => "EMPTY_PATH",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::NotAFile => "NOT_A_FILE",
            Self::NotADirectory => "NOT_A_DIRECTORY",
            Self::InvalidFileExtension => "INVALID_FILE_EXTENSION",
            Self::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            Self::InvalidUrl => "INVALID_URL",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::ConnectionRefused => "CONNECTION_REFUSED",
            Self::DnsResolutionFailed => "DNS_RESOLUTION_FAILED",
            Self::ConnectionReset => "CONNECTION_RESET",
            Self::TlsError => "TLS_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::CliNotFound => "CLI_NOT_FOUND",
            Self::CliTimeout => "CLI_TIMEOUT",
        };
        f.write_str(label)
    }
}

/// One discrete reported problem.
///
/// Issues are value objects: created fresh per validation call and never
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use preflight_core::{Issue, IssueCode, Severity};
///
/// let issue = Issue::error(IssueCode::MissingParameter, "Missing required flag --source")
///     .with_field("--source")
///     .with_suggestion("Pass --source <ACCOUNT> or set a default identity");
///
/// assert_eq!(issue.severity, Severity::Error);
/// assert_eq!(issue.field.as_deref(), Some("--source"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Creates an error-severity issue.
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a warning-severity issue.
    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates an info-severity issue.
    pub fn info(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    fn new(severity: Severity, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            field: None,
            received: None,
            expected: None,
            suggestion: None,
        }
    }

    /// Names the parameter or input the issue refers to.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Records the value that was actually received.
    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Records the value or shape that was expected.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attaches an actionable remedy.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` for error-severity issues.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregated outcome of one validation call.
///
/// Holds only the issue list; validity and the error/warning partitions are
/// derived on access so they can never drift out of sync with `issues`.
///
/// # Examples
///
/// ```
/// use preflight_core::{Issue, IssueCode, ValidationResult};
///
/// let mut result = ValidationResult::ok();
/// assert!(result.valid());
///
/// result.push(Issue::warning(IssueCode::InvalidFormat, "odd but tolerated"));
/// assert!(result.valid());
///
/// result.push(Issue::error(IssueCode::MissingParameter, "missing --source"));
/// assert!(!result.valid());
/// assert_eq!(result.errors().count(), 1);
/// assert_eq!(result.warnings().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A result built from a list of issues.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// `true` iff no error-severity issue is present.
    pub fn valid(&self) -> bool {
        !self.issues.iter().any(Issue::is_error)
    }

    /// Error-severity issues, in report order.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Warning-severity issues, in report order.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Appends an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Appends all issues from `other`, preserving order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// `true` when no issues of any severity were reported.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
