//! Cross-validator integration scenarios.

use std::collections::BTreeMap;
use std::time::Duration;

use preflight_checks::env::{EnvSnapshot, validate_environment};
use preflight_checks::file::{FileRule, validate_file_rule};
use preflight_checks::net::{Endpoint, check_endpoints};
use preflight_checks::params::validate_parameters;
use preflight_core::{CommandSchema, IssueCode, ParamType, ParameterSchema};

fn deploy_schema() -> CommandSchema {
    CommandSchema::new("deploy", "Deploy a contract")
        .with_flag(
            ParameterSchema::new("--network", ParamType::Enum)
                .required()
                .with_enum_values(&["testnet", "mainnet", "futurenet", "localnet"]),
        )
        .with_flag(ParameterSchema::new("--source", ParamType::String).required())
        .with_alias("-n", "--network")
}

fn supplied(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_required_flag_roundtrip() {
    let schema = CommandSchema::new("x", "x")
        .with_flag(ParameterSchema::new("--source", ParamType::String).required());

    let missing = validate_parameters(&schema, &BTreeMap::new());
    assert_eq!(missing.issues.len(), 1);
    assert_eq!(missing.issues[0].code, IssueCode::MissingParameter);

    let provided = validate_parameters(&schema, &supplied(&[("--source", "dev")]));
    assert!(provided.valid());
    assert!(provided.is_empty());
}

#[test]
fn test_deploy_scenario_bad_then_good() {
    let bad = validate_parameters(&deploy_schema(), &supplied(&[("--network", "moon")]));
    let codes: Vec<_> = bad.issues.iter().map(|i| i.code).collect();
    assert_eq!(
        codes,
        vec![IssueCode::InvalidEnumValue, IssueCode::MissingParameter]
    );

    let good = validate_parameters(
        &deploy_schema(),
        &supplied(&[("--network", "testnet"), ("--source", "dev")]),
    );
    assert!(good.valid());
    assert!(good.is_empty());
}

#[test]
fn test_typo_flag_suggestion_within_distance() {
    let result = validate_parameters(
        &deploy_schema(),
        &supplied(&[
            ("--netwrok", "testnet"),
            ("--network", "testnet"),
            ("--source", "dev"),
        ]),
    );

    let unknown = result
        .issues
        .iter()
        .find(|i| i.code == IssueCode::UnknownFlag)
        .expect("unknown flag issue");
    assert!(unknown.suggestion.as_deref().unwrap().contains("--network"));
}

#[test]
fn test_environment_and_file_checks_against_temp_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("identity.toml"), "[identity]\n").unwrap();
    std::fs::write(dir.path().join("contract.wasm"), b"\0asm").unwrap();

    let env = EnvSnapshot::from_pairs([("STELLAR_ACCOUNT", "dev")]);
    let env_result = validate_environment(
        &env,
        &["STELLAR_ACCOUNT".to_string()],
        &["identity.toml".to_string()],
        None,
        None,
        Some(dir.path()),
    );
    assert!(env_result.is_empty());

    let file_result = validate_file_rule(
        &FileRule::new("contract.wasm")
            .with_extensions(&["wasm"])
            .readable(),
        Some(dir.path()),
    );
    assert!(file_result.is_empty());
}

#[test]
fn test_network_probe_failure_classes() {
    let endpoints = vec![
        Endpoint::new("refused", "http://127.0.0.1:1"),
        Endpoint::new("unresolved", "http://preflight-validators.invalid"),
    ];
    let result = check_endpoints(&endpoints, Duration::from_secs(5));

    assert_eq!(result.issues.len(), 2);
    assert_eq!(result.issues[0].code, IssueCode::ConnectionRefused);
    assert_eq!(result.issues[1].code, IssueCode::DnsResolutionFailed);
}
