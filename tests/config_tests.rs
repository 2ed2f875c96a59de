//! # Configuration Tests
//!
//! Command-line parsing, environment variable names, defaults and validation.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cloud_secrets::config::{
    AzureAuthMethod, Config, ConfigError, GcpCredentialSource, LogFormat, LogLevel, ProviderKind,
};
use std::time::Duration;

fn parse(args: &[&str]) -> Result<Config, clap::Error> {
    Config::try_parse_from(std::iter::once("cloud-secrets").chain(args.iter().copied()))
}

#[test]
fn test_defaults() {
    let config = parse(&["--provider", "aws", "--secret-name", "db-password"]).unwrap();

    assert_eq!(config.provider, ProviderKind::Aws);
    assert_eq!(config.interval, Duration::from_secs(60));
    assert!(!config.once);
    assert!(!config.reveal_secret);
    assert_eq!(config.log_format, LogFormat::Text);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.metrics_address, "0.0.0.0:7979".parse().unwrap());
    assert_eq!(config.aws_region, "us-east-1");
    assert_eq!(config.aws_api_retries, 3);
    assert_eq!(config.azure_region, "centralus");
    assert_eq!(config.azure_auth, AzureAuthMethod::Cli);
    assert_eq!(config.google_secret_version, "latest");
    assert_eq!(config.google_endpoint, "https://secretmanager.googleapis.com");
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_provider_is_rejected() {
    let error = parse(&["--provider", "digitalocean", "--secret-name", "db"]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_invalid_interval_is_rejected() {
    let error = parse(&["--provider", "aws", "--secret-name", "db", "--interval", "soon"])
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_compound_interval_and_address() {
    let config = parse(&[
        "--provider",
        "aws",
        "--secret-name",
        "db",
        "--interval",
        "1m30s",
        "--metrics-address",
        "127.0.0.1:9090",
    ])
    .unwrap();
    assert_eq!(config.interval, Duration::from_secs(90));
    assert_eq!(config.metrics_address, "127.0.0.1:9090".parse().unwrap());
}

#[test]
fn test_log_level_aliases() {
    for (value, expected) in [
        ("warn", LogLevel::Warning),
        ("warning", LogLevel::Warning),
        ("fatal", LogLevel::Fatal),
        ("panic", LogLevel::Panic),
    ] {
        let config = parse(&["--provider", "aws", "--secret-name", "db", "--log-level", value])
            .unwrap();
        assert_eq!(config.log_level, expected, "--log-level {value}");
    }
}

#[test]
fn test_every_flag_has_prefixed_env_var() {
    let command = Config::command();
    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        if matches!(id, "help" | "version") {
            continue;
        }
        let expected = format!("CLOUD_SECRETS_{}", id.to_uppercase());
        let env = arg
            .get_env()
            .unwrap_or_else(|| panic!("--{id} has no environment variable"));
        assert_eq!(env.to_str(), Some(expected.as_str()), "--{id}");
    }
}

#[test]
fn test_missing_secret_name_fails_validation() {
    let config = parse(&["--provider", "aws"]).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::MissingSecretName));

    let config = parse(&["--provider", "aws", "--secret-name", "   "]).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::MissingSecretName));
}

#[test]
fn test_zero_interval_fails_validation() {
    let config = parse(&["--provider", "aws", "--secret-name", "db", "--interval", "0"]).unwrap();
    assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
}

#[test]
fn test_provider_required_fields() {
    let config = parse(&["--provider", "azure", "--secret-name", "db"]).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::MissingProviderField {
            provider: ProviderKind::Azure,
            flag: "azure-key-vault",
        })
    );

    let config = parse(&["--provider", "google", "--secret-name", "db"]).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::MissingProviderField {
            provider: ProviderKind::Google,
            flag: "google-project-id",
        })
    );

    // Only the selected provider's fields matter
    let config = parse(&["--provider", "aws", "--secret-name", "db"]).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_workload_identity_without_client_id_is_valid() {
    let config = parse(&[
        "--provider",
        "azure",
        "--secret-name",
        "db",
        "--azure-key-vault",
        "my-vault",
        "--azure-auth",
        "workload-identity",
    ])
    .unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.azure().client_id, None);
    assert_eq!(config.azure().vault_url(), "https://my-vault.vault.azure.net/");
}

#[test]
fn test_provider_settings() {
    let config = parse(&[
        "--provider",
        "aws",
        "--secret-name",
        "db",
        "--aws-assume-role",
        "arn:aws:iam::123456789012:role/reader",
        "--aws-api-retries",
        "0",
    ])
    .unwrap();
    let aws = config.aws();
    assert_eq!(
        aws.assume_role.as_deref(),
        Some("arn:aws:iam::123456789012:role/reader")
    );
    assert_eq!(aws.api_retries, 0);

    let config = parse(&["--provider", "aws", "--secret-name", "db"]).unwrap();
    assert_eq!(config.aws().assume_role, None);

    let config = parse(&[
        "--provider",
        "google",
        "--secret-name",
        "db",
        "--google-project-id",
        "my-project",
        "--google-access-token",
        "ya29.token",
    ])
    .unwrap();
    let gcp = config.gcp();
    assert_eq!(gcp.project_id, "my-project");
    assert_eq!(
        gcp.credentials,
        GcpCredentialSource::AccessToken("ya29.token".to_string())
    );
}

#[test]
fn test_debug_redacts_access_token() {
    let config = parse(&[
        "--provider",
        "google",
        "--secret-name",
        "db",
        "--google-project-id",
        "my-project",
        "--google-access-token",
        "ya29.super-secret",
    ])
    .unwrap();
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("my-project"));
}
