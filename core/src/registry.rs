//! Named registry of command schemas.
//!
//! Schemas are static, in-process data: constructed once at startup,
//! validated on registration, and read-only thereafter. The built-in
//! registry covers the three commands the tool gates before handing off to
//! the external CLI: `deploy`, `build`, and `invoke`.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{CommandSchema, ParamType, ParameterSchema};
use crate::validate::{SchemaError, validate_schema};

/// Errors raised when registering a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A schema with the same command name is already registered.
    #[error("command already registered: {0}")]
    Duplicate(String),
    /// The schema failed structural validation.
    #[error("invalid schema for {command}: {} error(s)", .errors.len())]
    Invalid {
        command: String,
        errors: Vec<SchemaError>,
    },
}

/// Lookup table of registered command schemas.
///
/// # Examples
///
/// ```
/// use preflight_core::SchemaRegistry;
///
/// let registry = SchemaRegistry::builtin();
/// assert!(registry.get("deploy").is_some());
/// assert!(registry.get("teleport").is_none());
/// assert!(registry.command_names().contains(&"invoke"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, CommandSchema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of built-in commands.
    ///
    /// Built-in schemas are validated in tests; registration here cannot
    /// fail for them.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry
                .register(schema)
                .unwrap_or_else(|e| unreachable!("builtin schema rejected: {e}"));
        }
        registry
    }

    /// Registers a schema, validating it first.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Invalid`] when the schema fails structural
    /// validation, [`RegistryError::Duplicate`] when the command name is
    /// already taken.
    pub fn register(&mut self, schema: CommandSchema) -> Result<(), RegistryError> {
        let errors = validate_schema(&schema);
        if !errors.is_empty() {
            return Err(RegistryError::Invalid {
                command: schema.name.clone(),
                errors,
            });
        }
        if self.schemas.contains_key(&schema.name) {
            return Err(RegistryError::Duplicate(schema.name));
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Looks up a schema by command name.
    pub fn get(&self, name: &str) -> Option<&CommandSchema> {
        self.schemas.get(name)
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Iterates registered schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = &CommandSchema> {
        self.schemas.values()
    }
}

fn builtin_schemas() -> Vec<CommandSchema> {
    vec![deploy_schema(), build_schema(), invoke_schema()]
}

fn deploy_schema() -> CommandSchema {
    CommandSchema::new("deploy", "Deploy a compiled contract to a network")
        .with_usage("deploy <WASM> --network <NETWORK> --source <ACCOUNT> [--fee <STROOPS>]")
        .with_positional(
            ParameterSchema::new("wasm", ParamType::Path)
                .required()
                .with_label("Contract wasm")
                .with_description("Path to the compiled contract binary"),
        )
        .with_flag(
            ParameterSchema::new("--network", ParamType::Enum)
                .with_label("Network")
                .with_enum_values(&["testnet", "mainnet", "futurenet", "localnet"])
                .with_description("Named network to submit against")
                .excludes("--rpc-url"),
        )
        .with_flag(
            ParameterSchema::new("--source", ParamType::String)
                .required()
                .with_label("Source account")
                .with_pattern(
                    r"^[A-Za-z][A-Za-z0-9_-]*$",
                    "an identity name (letters, digits, dashes, underscores)",
                )
                .with_description("Identity that signs and pays for the transaction"),
        )
        .with_flag(
            ParameterSchema::new("--fee", ParamType::Number)
                .with_label("Fee")
                .with_range(100.0, 10_000_000.0)
                .with_default("100")
                .with_description("Transaction fee in stroops")
                .requires("--source"),
        )
        .with_flag(
            ParameterSchema::new("--rpc-url", ParamType::String)
                .with_label("RPC URL")
                .with_pattern(r"^https?://", "an http:// or https:// URL")
                .with_description("Explicit RPC endpoint instead of a named network"),
        )
        .with_alias("-n", "--network")
        .with_alias("-s", "--source")
        .needs_network()
        .needs_cli()
        .with_env_var("STELLAR_ACCOUNT")
        .with_config_file(".preflight/identity.toml")
        .with_min_cli_version(21)
}

fn build_schema() -> CommandSchema {
    CommandSchema::new("build", "Compile the contract in the current workspace")
        .with_usage("build [--profile <PROFILE>] [--out-dir <DIR>]")
        .with_flag(
            ParameterSchema::new("--profile", ParamType::Enum)
                .with_enum_values(&["dev", "release"])
                .with_default("release")
                .with_description("Build profile"),
        )
        .with_flag(
            ParameterSchema::new("--out-dir", ParamType::Path)
                .with_description("Directory receiving the compiled artifacts"),
        )
        .with_flag(
            ParameterSchema::new("--quiet", ParamType::Boolean)
                .with_description("Suppress build output")
                .excludes("--verbose"),
        )
        .with_flag(
            ParameterSchema::new("--verbose", ParamType::Boolean)
                .with_description("Verbose build output"),
        )
        .needs_cli()
        .with_min_cli_version(21)
}

fn invoke_schema() -> CommandSchema {
    CommandSchema::new("invoke", "Invoke a function on a deployed contract")
        .with_usage("invoke <CONTRACT_ID> --fn <FUNCTION> --source <ACCOUNT> [--network <NETWORK>]")
        .with_positional(
            ParameterSchema::new("contract-id", ParamType::String)
                .required()
                .with_label("Contract id")
                .with_pattern(r"^C[A-Z2-7]{55}$", "a contract address (C...)")
                .with_description("Address of the deployed contract"),
        )
        .with_flag(
            ParameterSchema::new("--network", ParamType::Enum)
                .with_enum_values(&["testnet", "mainnet", "futurenet", "localnet"])
                .with_default("testnet")
                .with_description("Named network to submit against"),
        )
        .with_flag(
            ParameterSchema::new("--source", ParamType::String)
                .required()
                .with_pattern(
                    r"^[A-Za-z][A-Za-z0-9_-]*$",
                    "an identity name (letters, digits, dashes, underscores)",
                )
                .with_description("Identity that signs and pays for the transaction"),
        )
        .with_flag(
            ParameterSchema::new("--fn", ParamType::String)
                .required()
                .with_label("Function")
                .with_description("Contract function to call"),
        )
        .with_flag(
            ParameterSchema::new("--args-file", ParamType::Path)
                .with_description("JSON file holding the invocation arguments")
                .requires("--fn"),
        )
        .with_alias("-n", "--network")
        .with_alias("-s", "--source")
        .needs_network()
        .needs_cli()
        .with_env_var("STELLAR_ACCOUNT")
        .with_min_cli_version(21)
}
