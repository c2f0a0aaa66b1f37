//! Pipeline defaults: probe timeouts and known-network endpoints.
//!
//! Loaded from a YAML file (typically `.preflight.yml` in the project root)
//! when present; every field has a default so a missing file means default
//! behavior, not an error path in the pipeline.
//!
//! # Example YAML
//!
//! ```yaml
//! network:
//!   timeout_ms: 5000
//!   known_networks:
//!     testnet: https://soroban-testnet.stellar.org
//!     localnet: http://localhost:8000/soroban/rpc
//! cli:
//!   timeout_ms: 5000
//!   program: stellar
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or saving a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Network stage defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,
    /// Named network → default RPC endpoint.
    pub known_networks: BTreeMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let known_networks = [
            ("testnet", "https://soroban-testnet.stellar.org"),
            ("mainnet", "https://soroban-rpc.stellar.org"),
            ("futurenet", "https://rpc-futurenet.stellar.org"),
            ("localnet", "http://localhost:8000/soroban/rpc"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            timeout_ms: 5000,
            known_networks,
        }
    }
}

/// External-CLI probe defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Hard timeout for the availability probe in milliseconds.
    pub timeout_ms: u64,
    /// Binary name used when no explicit path is supplied.
    pub program: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            program: "stellar".to_string(),
        }
    }
}

/// Top-level pipeline configuration.
///
/// # Examples
///
/// ```
/// use preflight_pipeline::config::PreflightConfig;
///
/// let config = PreflightConfig::default();
/// assert_eq!(config.network.timeout_ms, 5000);
/// assert!(config.resolve_network("testnet").is_some());
/// assert!(config.resolve_network("moon").is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    pub network: NetworkConfig,
    pub cli: CliConfig,
}

impl PreflightConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Yaml`] when parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(serde_yaml::to_writer(writer, self)?)
    }

    /// Default RPC endpoint for a named network.
    pub fn resolve_network(&self, name: &str) -> Option<&str> {
        self.network.known_networks.get(name).map(String::as_str)
    }

    /// Network probe timeout as a [`Duration`].
    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network.timeout_ms)
    }

    /// CLI probe timeout as a [`Duration`].
    pub fn cli_timeout(&self) -> Duration {
        Duration::from_millis(self.cli.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_networks() {
        let config = PreflightConfig::default();
        for network in ["testnet", "mainnet", "futurenet", "localnet"] {
            assert!(config.resolve_network(network).is_some(), "{network}");
        }
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "network:\n  timeout_ms: 250\n";
        let config: PreflightConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.network.timeout_ms, 250);
        assert_eq!(config.cli.program, "stellar");
        assert!(!config.network.known_networks.is_empty());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preflight.yml");

        let mut original = PreflightConfig::default();
        original.cli.timeout_ms = 1234;
        original.save(&path).unwrap();

        let loaded = PreflightConfig::load(&path).unwrap();
        assert_eq!(loaded.cli.timeout_ms, 1234);
        assert_eq!(
            loaded.resolve_network("testnet"),
            original.resolve_network("testnet")
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = PreflightConfig::load("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
