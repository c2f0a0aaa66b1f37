//! Schema type definitions for command and parameter modeling.
//!
//! This module defines the declarative data model consumed by the
//! validators: what commands exist, which positional arguments and flags
//! they accept, and which constraints tie parameters to each other. The
//! types are designed for serialization with [`serde`] and round-trip
//! through JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value type accepted by a parameter.
///
/// # Examples
///
/// ```
/// use preflight_core::ParamType;
///
/// let ty = ParamType::default();
/// assert_eq!(ty, ParamType::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Free-form string, optionally constrained by a regex pattern.
    #[default]
    String,
    /// Numeric value, optionally constrained by an inclusive range.
    Number,
    /// Boolean literal (`true`/`false`/`1`/`0`/`yes`/`no`).
    Boolean,
    /// One of a fixed set of values.
    Enum,
    /// Filesystem path.
    Path,
}

/// Schema for one positional argument or flag.
///
/// Built through the constructor plus chained builder methods, the same way
/// command schemas are assembled elsewhere in this workspace. A parameter is
/// immutable by convention once its command schema has been registered.
///
/// # Examples
///
/// ```
/// use preflight_core::{ParamType, ParameterSchema};
///
/// let network = ParameterSchema::new("--network", ParamType::Enum)
///     .required()
///     .with_enum_values(&["testnet", "mainnet"])
///     .with_description("Network to submit against");
///
/// assert!(network.required);
/// assert_eq!(network.enum_values.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Canonical name, including leading dashes for flags (e.g. `--network`).
    pub name: String,
    /// Optional human label used in prompts and reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Value type this parameter accepts.
    pub param_type: ParamType,
    /// Whether the parameter must be supplied with a non-empty value.
    pub required: bool,
    /// Default value substituted when the parameter is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Description from the command's documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Regex source a string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Human phrasing of `pattern`, used in issue messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_description: Option<String>,
    /// Accepted values for [`ParamType::Enum`] parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Inclusive lower bound for [`ParamType::Number`] parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for [`ParamType::Number`] parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Parameters that cannot co-occur with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutually_exclusive_with: Vec<String>,
    /// Parameters that must co-occur with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ParameterSchema {
    /// Creates an optional parameter of the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use preflight_core::{ParamType, ParameterSchema};
    ///
    /// let fee = ParameterSchema::new("--fee", ParamType::Number);
    /// assert!(!fee.required);
    /// assert_eq!(fee.name, "--fee");
    /// ```
    pub fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            param_type,
            required: false,
            default_value: None,
            description: None,
            pattern: None,
            pattern_description: None,
            enum_values: Vec::new(),
            min: None,
            max: None,
            mutually_exclusive_with: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the human label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Sets the default value substituted when the parameter is absent.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the validation pattern and its human phrasing.
    pub fn with_pattern(mut self, pattern: &str, description: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self.pattern_description = Some(description.to_string());
        self
    }

    /// Sets the accepted enum values.
    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|v| (*v).to_string()).collect();
        self
    }

    /// Sets the inclusive numeric range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Declares that this parameter cannot co-occur with `other`.
    pub fn excludes(mut self, other: &str) -> Self {
        self.mutually_exclusive_with.push(other.to_string());
        self
    }

    /// Declares that supplying this parameter requires `other` as well.
    pub fn requires(mut self, other: &str) -> Self {
        self.depends_on.push(other.to_string());
        self
    }

    /// Returns the label when set, falling back to the name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Complete schema for one invocable command.
///
/// This is the primary type of the crate: the declarative description the
/// validators and the pipeline consume. Positional arguments and flags are
/// ordered lists of [`ParameterSchema`]; `aliases` maps short flags to
/// canonical names; the remaining fields are command-level requirements the
/// environment, CLI-availability, and network stages read.
///
/// # Examples
///
/// ```
/// use preflight_core::{CommandSchema, ParamType, ParameterSchema};
///
/// let schema = CommandSchema::new("deploy", "Deploy a compiled contract")
///     .with_usage("deploy <WASM> --network <NETWORK> --source <ACCOUNT>")
///     .with_positional(ParameterSchema::new("wasm", ParamType::Path).required())
///     .with_flag(
///         ParameterSchema::new("--network", ParamType::Enum)
///             .required()
///             .with_enum_values(&["testnet", "mainnet"]),
///     )
///     .with_alias("-n", "--network")
///     .needs_network();
///
/// assert!(schema.find_parameter("--network").is_some());
/// assert_eq!(schema.resolve_alias("-n"), Some("--network"));
/// assert!(schema.requires_network);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Command name (e.g. `deploy`).
    pub name: String,
    /// Short description.
    pub description: String,
    /// Usage template shown in help and reports.
    pub usage: String,
    /// Ordered positional arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positional: Vec<ParameterSchema>,
    /// Ordered flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<ParameterSchema>,
    /// Short flag → canonical name (e.g. `-n` → `--network`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    /// Whether the command needs reachable network endpoints.
    #[serde(default)]
    pub requires_network: bool,
    /// Whether the command shells out to the external CLI binary.
    #[serde(default)]
    pub requires_cli: bool,
    /// Environment variables that must be present and non-blank.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_env_vars: Vec<String>,
    /// Configuration files that must exist as regular files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_config_files: Vec<String>,
    /// Minimum major version of the external CLI binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cli_version: Option<u32>,
}

impl CommandSchema {
    /// Creates a new command schema with the given name and description.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Sets the usage template.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Appends a positional argument.
    pub fn with_positional(mut self, param: ParameterSchema) -> Self {
        self.positional.push(param);
        self
    }

    /// Appends a flag.
    pub fn with_flag(mut self, param: ParameterSchema) -> Self {
        self.flags.push(param);
        self
    }

    /// Registers a short-flag alias for a canonical flag name.
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases
            .insert(alias.to_string(), canonical.to_string());
        self
    }

    /// Marks the command as needing reachable network endpoints.
    pub fn needs_network(mut self) -> Self {
        self.requires_network = true;
        self
    }

    /// Marks the command as shelling out to the external CLI binary.
    pub fn needs_cli(mut self) -> Self {
        self.requires_cli = true;
        self
    }

    /// Requires an environment variable to be present and non-blank.
    pub fn with_env_var(mut self, name: &str) -> Self {
        self.required_env_vars.push(name.to_string());
        self
    }

    /// Requires a configuration file to exist as a regular file.
    pub fn with_config_file(mut self, path: &str) -> Self {
        self.required_config_files.push(path.to_string());
        self
    }

    /// Sets the minimum major version of the external CLI binary.
    pub fn with_min_cli_version(mut self, major: u32) -> Self {
        self.min_cli_version = Some(major);
        self
    }

    /// Finds a declared parameter (positional or flag) by canonical name.
    ///
    /// # Examples
    ///
    /// ```
    /// use preflight_core::{CommandSchema, ParamType, ParameterSchema};
    ///
    /// let schema = CommandSchema::new("build", "Build")
    ///     .with_flag(ParameterSchema::new("--profile", ParamType::Enum));
    ///
    /// assert!(schema.find_parameter("--profile").is_some());
    /// assert!(schema.find_parameter("--missing").is_none());
    /// ```
    pub fn find_parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.positional
            .iter()
            .chain(self.flags.iter())
            .find(|p| p.name == name)
    }

    /// Iterates all declared parameters in schema order, positionals first.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterSchema> {
        self.positional.iter().chain(self.flags.iter())
    }

    /// All canonical parameter names in schema order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters().map(|p| p.name.as_str()).collect()
    }

    /// Resolves a supplied key: alias → canonical, known name → itself.
    pub fn resolve_alias(&self, key: &str) -> Option<&str> {
        if let Some(canonical) = self.aliases.get(key) {
            return Some(canonical.as_str());
        }
        self.find_parameter(key).map(|p| p.name.as_str())
    }

    /// Returns `true` when `key` is a declared name or a registered alias.
    pub fn knows(&self, key: &str) -> bool {
        self.resolve_alias(key).is_some()
    }
}

/// A `major.minor.patch` version with lenient parsing.
///
/// Minor and patch components default to zero when absent, so `"21"` and
/// `"21.0.0"` compare equal.
///
/// # Examples
///
/// ```
/// use preflight_core::Version;
///
/// let v: Version = "21.4.1".parse().unwrap();
/// assert_eq!(v.major, 21);
/// assert!(v >= "21".parse().unwrap());
/// assert_eq!(v.to_string(), "21.4.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Creates a version from explicit components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Cut pre-release / build suffixes: "21.4.1-rc.1" → "21.4.1".
        let core = s
            .trim()
            .trim_start_matches(['v', 'V'])
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        let mut parts = core.split('.');
        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("empty version string: {s:?}"))?
            .parse::<u32>()
            .map_err(|e| format!("invalid major component in {s:?}: {e}"))?;
        let minor = match parts.next() {
            Some(p) => p
                .parse::<u32>()
                .map_err(|e| format!("invalid minor component in {s:?}: {e}"))?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p
                .parse::<u32>()
                .map_err(|e| format!("invalid patch component in {s:?}: {e}"))?,
            None => 0,
        };
        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_builder_chain() {
        let param = ParameterSchema::new("--fee", ParamType::Number)
            .required()
            .with_range(100.0, 10_000_000.0)
            .with_description("Transaction fee in stroops")
            .requires("--source");

        assert!(param.required);
        assert_eq!(param.min, Some(100.0));
        assert_eq!(param.max, Some(10_000_000.0));
        assert_eq!(param.depends_on, vec!["--source"]);
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let bare = ParameterSchema::new("--network", ParamType::Enum);
        assert_eq!(bare.display_name(), "--network");

        let labeled = bare.with_label("Network");
        assert_eq!(labeled.display_name(), "Network");
    }

    #[test]
    fn test_resolve_alias_and_knows() {
        let schema = CommandSchema::new("deploy", "Deploy")
            .with_flag(ParameterSchema::new("--network", ParamType::Enum))
            .with_alias("-n", "--network");

        assert_eq!(schema.resolve_alias("-n"), Some("--network"));
        assert_eq!(schema.resolve_alias("--network"), Some("--network"));
        assert_eq!(schema.resolve_alias("--bogus"), None);
        assert!(schema.knows("-n"));
        assert!(!schema.knows("--bogus"));
    }

    #[test]
    fn test_parameter_order_positionals_first() {
        let schema = CommandSchema::new("invoke", "Invoke")
            .with_flag(ParameterSchema::new("--fn", ParamType::String))
            .with_positional(ParameterSchema::new("contract-id", ParamType::String));

        assert_eq!(schema.parameter_names(), vec!["contract-id", "--fn"]);
    }

    #[test]
    fn test_version_parse_variants() {
        assert_eq!("21".parse::<Version>().unwrap(), Version::new(21, 0, 0));
        assert_eq!("21.4".parse::<Version>().unwrap(), Version::new(21, 4, 0));
        assert_eq!(
            "v21.4.1-rc.1".parse::<Version>().unwrap(),
            Version::new(21, 4, 1)
        );
        assert!("".parse::<Version>().is_err());
        assert!("abc".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        let old: Version = "20.9.9".parse().unwrap();
        let new: Version = "21.0.0".parse().unwrap();
        assert!(old < new);
    }

    #[test]
    fn test_schema_serde_roundtrip() {
        let schema = CommandSchema::new("deploy", "Deploy a contract")
            .with_flag(
                ParameterSchema::new("--network", ParamType::Enum)
                    .with_enum_values(&["testnet", "mainnet"]),
            )
            .with_alias("-n", "--network")
            .needs_network();

        let json = serde_json::to_string(&schema).unwrap();
        let back: CommandSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "deploy");
        assert_eq!(back.aliases.get("-n").map(String::as_str), Some("--network"));
        assert!(back.requires_network);
    }
}
