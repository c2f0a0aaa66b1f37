//! The four pre-flight validators: parameter, environment, file, network.
//!
//! Each validator is a pure function from its inputs to a
//! [`ValidationResult`](preflight_core::ValidationResult): validators never
//! panic and never return `Err` — every failure mode, including malformed
//! input, surfaces as an issue. The pipeline crate composes these into
//! ordered checks; callers can also use them directly.
//!
//! - [`params::validate_parameters`] — supplied values against a
//!   [`CommandSchema`](preflight_core::CommandSchema): unknown flags (with
//!   "did you mean"), alias resolution, types/ranges/patterns, mutual
//!   exclusion and dependencies.
//! - [`env::validate_environment`] — environment variables, config files,
//!   and the minimum CLI version, against a caller-captured
//!   [`EnvSnapshot`](env::EnvSnapshot).
//! - [`file::validate_file_rules`] — existence, entry type, extensions,
//!   permissions.
//! - [`net::check_endpoints`] — concurrent reachability probes with
//!   transport-failure classification.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use preflight_checks::params::validate_parameters;
//! use preflight_core::{CommandSchema, ParamType, ParameterSchema};
//!
//! let schema = CommandSchema::new("build", "Build")
//!     .with_flag(
//!         ParameterSchema::new("--profile", ParamType::Enum)
//!             .with_enum_values(&["dev", "release"]),
//!     );
//!
//! let mut supplied = BTreeMap::new();
//! supplied.insert("--profile".to_string(), "release".to_string());
//! assert!(validate_parameters(&schema, &supplied).valid());
//! ```

pub mod env;
pub mod file;
pub mod net;
pub mod params;
pub mod suggest;
pub mod version;
