//! Parameter validation against a command schema.
//!
//! Consumes a [`CommandSchema`] and the map of supplied values, and reports
//! every problem as an [`Issue`]: unknown keys (with "did you mean"
//! suggestions), missing required parameters, type and range violations,
//! and cross-parameter constraint breaches. Never panics, never returns an
//! error; malformed input is data.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::warn;

use preflight_core::{CommandSchema, Issue, IssueCode, ParamType, ParameterSchema, ValidationResult};

use crate::suggest::closest_match;

/// Boolean literals accepted for [`ParamType::Boolean`] parameters.
const BOOLEAN_LITERALS: &[&str] = &["true", "false", "1", "0", "yes", "no"];

/// Validates supplied parameter values against `schema`.
///
/// Issue ordering: unknown-key issues first, then per-parameter issues in
/// schema declaration order (positionals before flags), then
/// cross-parameter issues.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use preflight_checks::params::validate_parameters;
/// use preflight_core::{CommandSchema, IssueCode, ParamType, ParameterSchema};
///
/// let schema = CommandSchema::new("deploy", "Deploy")
///     .with_flag(
///         ParameterSchema::new("--network", ParamType::Enum)
///             .required()
///             .with_enum_values(&["testnet", "mainnet"]),
///     );
///
/// let result = validate_parameters(&schema, &BTreeMap::new());
/// assert!(!result.valid());
/// assert_eq!(result.issues[0].code, IssueCode::MissingParameter);
/// ```
pub fn validate_parameters(
    schema: &CommandSchema,
    supplied: &BTreeMap<String, String>,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    report_unknown_keys(schema, supplied, &mut result);
    let values = resolve_aliases(schema, supplied);

    for param in schema.parameters() {
        validate_parameter(param, values.get(param.name.as_str()), &mut result);
    }

    check_cross_parameter(schema, &values, &mut result);

    result
}

/// Reports supplied keys the schema does not declare.
fn report_unknown_keys(
    schema: &CommandSchema,
    supplied: &BTreeMap<String, String>,
    result: &mut ValidationResult,
) {
    let known: Vec<String> = schema
        .parameters()
        .map(|p| p.name.clone())
        .chain(schema.aliases.keys().cloned())
        .collect();

    for key in supplied.keys() {
        if schema.knows(key) {
            continue;
        }
        let mut issue = Issue::error(IssueCode::UnknownFlag, format!("Unknown flag: {key}"))
            .with_field(key.clone())
            .with_received(key.clone());
        if let Some(candidate) = closest_match(key, &known) {
            issue = issue.with_suggestion(format!("Did you mean {candidate}?"));
        }
        result.push(issue);
    }
}

/// Copies supplied values into a canonical-key map, resolving aliases.
///
/// A value under an alias key moves to the canonical key unless the
/// canonical key was also supplied, in which case the canonical value wins
/// and the alias entry is dropped.
fn resolve_aliases<'a>(
    schema: &'a CommandSchema,
    supplied: &'a BTreeMap<String, String>,
) -> BTreeMap<&'a str, &'a str> {
    let mut values: BTreeMap<&str, &str> = BTreeMap::new();

    // Canonical keys first so they take precedence over aliases.
    for (key, value) in supplied {
        if schema.find_parameter(key).is_some() {
            values.insert(key.as_str(), value.as_str());
        }
    }
    for (key, value) in supplied {
        if let Some(canonical) = schema.aliases.get(key.as_str()) {
            values.entry(canonical.as_str()).or_insert(value.as_str());
        }
    }

    values
}

fn validate_parameter(
    param: &ParameterSchema,
    value: Option<&&str>,
    result: &mut ValidationResult,
) {
    let value = value.map(|v| v.trim()).filter(|v| !v.is_empty());

    let Some(value) = value else {
        if param.required {
            let mut issue = Issue::error(
                IssueCode::MissingParameter,
                format!("Missing required parameter: {}", param.display_name()),
            )
            .with_field(param.name.clone());
            if let Some(desc) = &param.description {
                issue = issue.with_suggestion(format!("Supply {} ({})", param.name, desc));
            } else {
                issue = issue.with_suggestion(format!("Supply {}", param.name));
            }
            result.push(issue);
        }
        return;
    };

    match param.param_type {
        ParamType::Number => validate_number(param, value, result),
        ParamType::Boolean => validate_boolean(param, value, result),
        ParamType::Enum => validate_enum(param, value, result),
        ParamType::String => validate_pattern(param, value, result),
        // Path values are checked by the file validator, which owns
        // existence and permission semantics.
        ParamType::Path => {}
    }
}

fn validate_number(param: &ParameterSchema, value: &str, result: &mut ValidationResult) {
    let Ok(number) = value.parse::<f64>() else {
        result.push(
            Issue::error(
                IssueCode::InvalidType,
                format!("{} expects a number, got {value:?}", param.display_name()),
            )
            .with_field(param.name.clone())
            .with_received(value.to_string())
            .with_expected("a number".to_string())
            .with_suggestion(format!("Pass a numeric value for {}", param.name)),
        );
        return;
    };

    let below = param.min.is_some_and(|min| number < min);
    let above = param.max.is_some_and(|max| number > max);
    if below || above {
        let expected = match (param.min, param.max) {
            (Some(min), Some(max)) => format!("{min}..={max}"),
            (Some(min), None) => format!(">= {min}"),
            (None, Some(max)) => format!("<= {max}"),
            (None, None) => unreachable!("range issue without bounds"),
        };
        result.push(
            Issue::error(
                IssueCode::OutOfRange,
                format!("{} is out of range: {value}", param.display_name()),
            )
            .with_field(param.name.clone())
            .with_received(value.to_string())
            .with_expected(expected.clone())
            .with_suggestion(format!("Use a value in {expected} for {}", param.name)),
        );
    }
}

fn validate_boolean(param: &ParameterSchema, value: &str, result: &mut ValidationResult) {
    let lower = value.to_ascii_lowercase();
    if !BOOLEAN_LITERALS.contains(&lower.as_str()) {
        result.push(
            Issue::error(
                IssueCode::InvalidBoolean,
                format!("{} expects a boolean, got {value:?}", param.display_name()),
            )
            .with_field(param.name.clone())
            .with_received(value.to_string())
            .with_expected(BOOLEAN_LITERALS.join("|"))
            .with_suggestion(format!("Use true or false for {}", param.name)),
        );
    }
}

fn validate_enum(param: &ParameterSchema, value: &str, result: &mut ValidationResult) {
    let matches = param
        .enum_values
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(value));
    if !matches {
        let allowed = param.enum_values.join(", ");
        let mut issue = Issue::error(
            IssueCode::InvalidEnumValue,
            format!("{} must be one of: {allowed}", param.display_name()),
        )
        .with_field(param.name.clone())
        .with_received(value.to_string())
        .with_expected(allowed.clone());
        issue = match closest_match(value, &param.enum_values) {
            Some(candidate) => issue.with_suggestion(format!("Did you mean {candidate}?")),
            None => issue.with_suggestion(format!("Pick one of: {allowed}")),
        };
        result.push(issue);
    }
}

fn validate_pattern(param: &ParameterSchema, value: &str, result: &mut ValidationResult) {
    let Some(pattern) = &param.pattern else {
        return;
    };
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(error) => {
            // A schema bug, not a user error; registration validation is
            // where it belongs.
            warn!(
                parameter = %param.name,
                pattern = %pattern,
                %error,
                "Schema pattern failed to compile, skipping pattern check"
            );
            return;
        }
    };
    if !regex.is_match(value) {
        let expected = param
            .pattern_description
            .clone()
            .unwrap_or_else(|| pattern.clone());
        result.push(
            Issue::error(
                IssueCode::InvalidFormat,
                format!("{} has an invalid format", param.display_name()),
            )
            .with_field(param.name.clone())
            .with_received(value.to_string())
            .with_expected(expected.clone())
            .with_suggestion(format!("Expected {expected}")),
        );
    }
}

/// Mutual-exclusion and dependency checks across the supplied values.
///
/// Exclusive pairs are deduplicated through a sorted pair key, so a pair is
/// reported once no matter which side declares the relation.
fn check_cross_parameter(
    schema: &CommandSchema,
    values: &BTreeMap<&str, &str>,
    result: &mut ValidationResult,
) {
    let present =
        |name: &str| -> bool { values.get(name).is_some_and(|v| !v.trim().is_empty()) };

    let mut reported_pairs: BTreeSet<(String, String)> = BTreeSet::new();

    for param in schema.parameters() {
        if !present(&param.name) {
            continue;
        }

        for other in &param.mutually_exclusive_with {
            if !present(other) {
                continue;
            }
            let pair = if param.name < *other {
                (param.name.clone(), other.clone())
            } else {
                (other.clone(), param.name.clone())
            };
            if !reported_pairs.insert(pair.clone()) {
                continue;
            }
            result.push(
                Issue::error(
                    IssueCode::MutuallyExclusive,
                    format!("{} and {} cannot be used together", pair.0, pair.1),
                )
                .with_field(param.name.clone())
                .with_suggestion(format!("Remove either {} or {}", pair.0, pair.1)),
            );
        }

        for dependency in &param.depends_on {
            if present(dependency) {
                continue;
            }
            result.push(
                Issue::error(
                    IssueCode::MissingDependency,
                    format!("{} requires {} to also be set", param.name, dependency),
                )
                .with_field(param.name.clone())
                .with_expected(dependency.clone())
                .with_suggestion(format!("Also supply {dependency}")),
            );
        }
    }
}
