//! Registration-time schema validation.
//!
//! Validates structural invariants of command schemas before they enter the
//! registry: duplicate or empty parameter names, dangling aliases, and
//! constraint lists (`mutually_exclusive_with` / `depends_on`) that reference
//! parameters the command does not declare. A typo in a constraint list would
//! otherwise silently never fire at validation time, so registration fails
//! fast instead.
//!
//! # Examples
//!
//! ```
//! use preflight_core::{CommandSchema, ParamType, ParameterSchema, validate_schema};
//!
//! let good = CommandSchema::new("build", "Build")
//!     .with_flag(ParameterSchema::new("--quiet", ParamType::Boolean));
//! assert!(validate_schema(&good).is_empty());
//!
//! // --quiet excludes a flag that does not exist
//! let bad = CommandSchema::new("build", "Build")
//!     .with_flag(ParameterSchema::new("--quiet", ParamType::Boolean).excludes("--verbose"));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{CommandSchema, ParamType};

/// Structural problems found in a command schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Command name is empty or whitespace-only.
    #[error("schema command name cannot be empty")]
    EmptyCommandName,
    /// A parameter has an empty name.
    #[error("parameter name cannot be empty")]
    EmptyParameterName,
    /// Two parameters share a name.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),
    /// An alias key shadows a declared parameter name.
    #[error("alias {0} shadows a declared parameter")]
    AliasShadowsParameter(String),
    /// An alias points at a parameter the command does not declare.
    #[error("alias {alias} targets unknown parameter {target}")]
    DanglingAlias { alias: String, target: String },
    /// A constraint list references a parameter the command does not declare.
    #[error("{param} references unknown parameter {target} in {relation}")]
    DanglingConstraint {
        param: String,
        target: String,
        relation: &'static str,
    },
    /// A parameter names itself in one of its constraint lists.
    #[error("{0} references itself in a constraint list")]
    SelfReference(String),
    /// An enum parameter declares no accepted values.
    #[error("enum parameter {0} has no enum values")]
    EmptyEnum(String),
    /// A non-enum parameter carries enum values.
    #[error("parameter {0} has enum values but is not an enum")]
    UnexpectedEnumValues(String),
    /// Numeric bounds are inverted.
    #[error("parameter {0} has min greater than max")]
    InvertedRange(String),
}

/// Validates a command schema, returning every structural error found.
///
/// An empty result means the schema is safe to register.
pub fn validate_schema(schema: &CommandSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(SchemaError::EmptyCommandName);
    }

    let mut names: HashSet<&str> = HashSet::new();
    for param in schema.parameters() {
        let name = param.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyParameterName);
            continue;
        }
        if !names.insert(name) {
            errors.push(SchemaError::DuplicateParameter(name.to_string()));
        }
    }

    for (alias, target) in &schema.aliases {
        if names.contains(alias.as_str()) {
            errors.push(SchemaError::AliasShadowsParameter(alias.clone()));
        }
        if !names.contains(target.as_str()) {
            errors.push(SchemaError::DanglingAlias {
                alias: alias.clone(),
                target: target.clone(),
            });
        }
    }

    for param in schema.parameters() {
        for (relation, list) in [
            ("mutually_exclusive_with", &param.mutually_exclusive_with),
            ("depends_on", &param.depends_on),
        ] {
            for target in list {
                if target == &param.name {
                    errors.push(SchemaError::SelfReference(param.name.clone()));
                } else if !names.contains(target.as_str()) {
                    errors.push(SchemaError::DanglingConstraint {
                        param: param.name.clone(),
                        target: target.clone(),
                        relation,
                    });
                }
            }
        }

        match param.param_type {
            ParamType::Enum if param.enum_values.is_empty() => {
                errors.push(SchemaError::EmptyEnum(param.name.clone()));
            }
            ParamType::Enum => {}
            _ if !param.enum_values.is_empty() => {
                errors.push(SchemaError::UnexpectedEnumValues(param.name.clone()));
            }
            _ => {}
        }

        if let (Some(min), Some(max)) = (param.min, param.max) {
            if min > max {
                errors.push(SchemaError::InvertedRange(param.name.clone()));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterSchema;

    fn flag(name: &str, ty: ParamType) -> ParameterSchema {
        ParameterSchema::new(name, ty)
    }

    #[test]
    fn test_accepts_valid_schema() {
        let schema = CommandSchema::new("deploy", "Deploy")
            .with_positional(flag("wasm", ParamType::Path).required())
            .with_flag(
                flag("--network", ParamType::Enum).with_enum_values(&["testnet", "mainnet"]),
            )
            .with_flag(flag("--rpc-url", ParamType::String).excludes("--network"))
            .with_alias("-n", "--network");

        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_rejects_empty_command_name() {
        let schema = CommandSchema::new("  ", "blank");
        assert!(
            validate_schema(&schema).contains(&SchemaError::EmptyCommandName)
        );
    }

    #[test]
    fn test_rejects_duplicate_parameter() {
        let schema = CommandSchema::new("build", "Build")
            .with_flag(flag("--quiet", ParamType::Boolean))
            .with_flag(flag("--quiet", ParamType::Boolean));

        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::DuplicateParameter("--quiet".to_string())]
        );
    }

    #[test]
    fn test_rejects_dangling_alias() {
        let schema = CommandSchema::new("build", "Build").with_alias("-q", "--quiet");
        let errors = validate_schema(&schema);
        assert!(matches!(
            errors.as_slice(),
            [SchemaError::DanglingAlias { alias, target }]
                if alias == "-q" && target == "--quiet"
        ));
    }

    #[test]
    fn test_rejects_alias_shadowing_parameter() {
        let schema = CommandSchema::new("build", "Build")
            .with_flag(flag("--quiet", ParamType::Boolean))
            .with_alias("--quiet", "--quiet");

        let errors = validate_schema(&schema);
        assert!(errors.contains(&SchemaError::AliasShadowsParameter("--quiet".to_string())));
    }

    #[test]
    fn test_rejects_dangling_constraint_reference() {
        let schema = CommandSchema::new("deploy", "Deploy")
            .with_flag(flag("--fee", ParamType::Number).requires("--source"));

        let errors = validate_schema(&schema);
        assert!(matches!(
            errors.as_slice(),
            [SchemaError::DanglingConstraint { param, target, relation }]
                if param == "--fee" && target == "--source" && *relation == "depends_on"
        ));
    }

    #[test]
    fn test_rejects_self_reference() {
        let schema = CommandSchema::new("build", "Build")
            .with_flag(flag("--quiet", ParamType::Boolean).excludes("--quiet"));

        let errors = validate_schema(&schema);
        assert!(errors.contains(&SchemaError::SelfReference("--quiet".to_string())));
    }

    #[test]
    fn test_rejects_empty_enum_and_stray_enum_values() {
        let empty_enum =
            CommandSchema::new("x", "x").with_flag(flag("--mode", ParamType::Enum));
        assert!(
            validate_schema(&empty_enum).contains(&SchemaError::EmptyEnum("--mode".to_string()))
        );

        let stray = CommandSchema::new("x", "x").with_flag(
            flag("--mode", ParamType::String).with_enum_values(&["a"]),
        );
        assert!(
            validate_schema(&stray)
                .contains(&SchemaError::UnexpectedEnumValues("--mode".to_string()))
        );
    }

    #[test]
    fn test_rejects_inverted_range() {
        let schema = CommandSchema::new("x", "x")
            .with_flag(flag("--fee", ParamType::Number).with_range(10.0, 1.0));
        assert!(
            validate_schema(&schema).contains(&SchemaError::InvertedRange("--fee".to_string()))
        );
    }
}
