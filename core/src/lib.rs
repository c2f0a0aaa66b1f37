//! Core data model for pre-flight command validation.
//!
//! This crate defines the declarative types the validation pipeline
//! consumes:
//!
//! - [`CommandSchema`] / [`ParameterSchema`] — what a command accepts and
//!   which constraints tie its parameters together.
//! - [`Issue`] / [`ValidationResult`] — the failure-is-data model: every
//!   problem a validator finds is an issue with a [`Severity`], a
//!   machine-readable [`IssueCode`], and (where the user can act) a
//!   suggestion.
//! - [`SchemaRegistry`] — the named store of built-in command schemas,
//!   validated on registration ([`validate_schema`]) so constraint typos
//!   fail fast instead of silently never firing.
//! - [`Version`] — lenient `major.minor.patch` parsing for the minimum
//!   CLI version gate.
//!
//! # Example
//!
//! ```
//! use preflight_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         CommandSchema::new("deploy", "Deploy a contract")
//!             .with_flag(
//!                 ParameterSchema::new("--network", ParamType::Enum)
//!                     .required()
//!                     .with_enum_values(&["testnet", "mainnet"]),
//!             )
//!             .with_alias("-n", "--network"),
//!     )
//!     .unwrap();
//!
//! let schema = registry.get("deploy").unwrap();
//! assert_eq!(schema.resolve_alias("-n"), Some("--network"));
//! ```

mod issue;
mod registry;
mod types;
mod validate;

pub use issue::{Issue, IssueCode, Severity, ValidationResult};
pub use registry::{RegistryError, SchemaRegistry};
pub use types::{CommandSchema, ParamType, ParameterSchema, Version};
pub use validate::{SchemaError, validate_schema};
