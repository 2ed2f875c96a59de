//! # Configuration
//!
//! Command-line configuration for the cloud-secrets binary.
//!
//! Every flag can be replaced by an environment variable: `--flag value` becomes
//! `CLOUD_SECRETS_FLAG=value` (dashes become underscores). Flags win over
//! environment variables.

pub mod duration;
pub mod provider;
pub mod validation;

pub use provider::{AwsConfig, AzureAuthMethod, AzureConfig, GcpConfig, GcpCredentialSource};

use crate::constants::{
    DEFAULT_AWS_API_RETRIES, DEFAULT_AWS_REGION, DEFAULT_AZURE_REGION, DEFAULT_GOOGLE_ENDPOINT,
    DEFAULT_GOOGLE_SECRET_VERSION, DEFAULT_INTERVAL, DEFAULT_METRICS_ADDRESS,
};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors detected while loading or validating configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no secret name specified")]
    MissingSecretName,
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("--{flag} is required when using the {provider} provider")]
    MissingProviderField {
        provider: ProviderKind,
        flag: &'static str,
    },
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },
    #[error("invalid metrics address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },
}

/// Supported secret backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// AWS Secrets Manager
    Aws,
    /// Azure Key Vault
    Azure,
    /// Google Secret Manager
    Google,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Azure => "azure",
            ProviderKind::Google => "google",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Log level, accepting the names operators already use for this tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
    /// Treated as `error`
    Fatal,
    /// Treated as `error`
    Panic,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    #[must_use]
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => "error",
        }
    }
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ngit: ",
    env!("BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("BUILD_DATETIME")
);

/// Cloud Secrets configuration
#[derive(Clone, Parser)]
#[command(
    name = "cloud-secrets",
    version,
    long_version = LONG_VERSION,
    about = "Cloud Secrets is a thin wrapper over cloud secret management services.",
    after_help = "\
Note that all flags may be replaced with env vars:
  --flag        ->  CLOUD_SECRETS_FLAG=1
  --flag value  ->  CLOUD_SECRETS_FLAG=value"
)]
pub struct Config {
    /// Name of the secret to retrieve
    #[arg(long, env = "CLOUD_SECRETS_SECRET_NAME", default_value = "")]
    pub secret_name: String,

    /// The cloud provider holding the secret
    #[arg(long, env = "CLOUD_SECRETS_PROVIDER", value_enum)]
    pub provider: ProviderKind,

    /// The interval between two consecutive synchronizations (e.g. 1m, 90s, 1m30s)
    #[arg(
        long,
        env = "CLOUD_SECRETS_INTERVAL",
        default_value = DEFAULT_INTERVAL,
        value_parser = duration::parse_duration
    )]
    pub interval: Duration,

    /// Exit after the first synchronization instead of polling
    #[arg(long, env = "CLOUD_SECRETS_ONCE")]
    pub once: bool,

    /// The format in which log messages are printed
    #[arg(long, env = "CLOUD_SECRETS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// The level of logging (RUST_LOG, when set, takes precedence)
    #[arg(long, env = "CLOUD_SECRETS_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Where to serve the metrics and health check endpoints (`:port` binds all interfaces)
    #[arg(
        long,
        env = "CLOUD_SECRETS_METRICS_ADDRESS",
        default_value = DEFAULT_METRICS_ADDRESS,
        value_parser = validation::parse_bind_address
    )]
    pub metrics_address: SocketAddr,

    /// Log the retrieved secret value at debug level. For troubleshooting only
    #[arg(long, env = "CLOUD_SECRETS_REVEAL_SECRET")]
    pub reveal_secret: bool,

    /// AWS region of the Secrets Manager endpoint
    #[arg(long, env = "CLOUD_SECRETS_AWS_REGION", default_value = DEFAULT_AWS_REGION)]
    pub aws_region: String,

    /// IAM role ARN to assume, e.g. for secrets in another AWS account (optional)
    #[arg(long, env = "CLOUD_SECRETS_AWS_ASSUME_ROLE", default_value = "")]
    pub aws_assume_role: String,

    /// Maximum number of retries for AWS API calls before giving up
    #[arg(long, env = "CLOUD_SECRETS_AWS_API_RETRIES", default_value_t = DEFAULT_AWS_API_RETRIES)]
    pub aws_api_retries: u32,

    /// Custom Secrets Manager endpoint, e.g. LocalStack (optional)
    #[arg(long, env = "CLOUD_SECRETS_AWS_ENDPOINT_URL")]
    pub aws_endpoint_url: Option<String>,

    /// Azure Key Vault name, or full vault URL
    #[arg(long, env = "CLOUD_SECRETS_AZURE_KEY_VAULT", default_value = "")]
    pub azure_key_vault: String,

    /// Azure region of the vault
    #[arg(long, env = "CLOUD_SECRETS_AZURE_REGION", default_value = DEFAULT_AZURE_REGION)]
    pub azure_region: String,

    /// Azure resource group of the vault
    #[arg(long, env = "CLOUD_SECRETS_AZURE_RESOURCE_GROUP", default_value = "")]
    pub azure_resource_group: String,

    /// How to authenticate against Azure
    #[arg(long, env = "CLOUD_SECRETS_AZURE_AUTH", value_enum, default_value_t = AzureAuthMethod::Cli)]
    pub azure_auth: AzureAuthMethod,

    /// Client ID of the managed or workload identity (optional)
    #[arg(long, env = "CLOUD_SECRETS_AZURE_CLIENT_ID")]
    pub azure_client_id: Option<String>,

    /// Google Cloud project holding the secret
    #[arg(long, env = "CLOUD_SECRETS_GOOGLE_PROJECT_ID", default_value = "")]
    pub google_project_id: String,

    /// Secret version to access
    #[arg(
        long,
        env = "CLOUD_SECRETS_GOOGLE_SECRET_VERSION",
        default_value = DEFAULT_GOOGLE_SECRET_VERSION
    )]
    pub google_secret_version: String,

    /// Secret Manager REST endpoint
    #[arg(long, env = "CLOUD_SECRETS_GOOGLE_ENDPOINT", default_value = DEFAULT_GOOGLE_ENDPOINT)]
    pub google_endpoint: String,

    /// OAuth2 access token to use instead of the metadata server (optional)
    #[arg(long, env = "CLOUD_SECRETS_GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub google_access_token: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_name", &self.secret_name)
            .field("provider", &self.provider)
            .field("interval", &duration::format_duration(self.interval))
            .field("once", &self.once)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .field("metrics_address", &self.metrics_address)
            .field("reveal_secret", &self.reveal_secret)
            .field("aws_region", &self.aws_region)
            .field("aws_assume_role", &self.aws_assume_role)
            .field("aws_api_retries", &self.aws_api_retries)
            .field("aws_endpoint_url", &self.aws_endpoint_url)
            .field("azure_key_vault", &self.azure_key_vault)
            .field("azure_region", &self.azure_region)
            .field("azure_resource_group", &self.azure_resource_group)
            .field("azure_auth", &self.azure_auth)
            .field("azure_client_id", &self.azure_client_id)
            .field("google_project_id", &self.google_project_id)
            .field("google_secret_version", &self.google_secret_version)
            .field("google_endpoint", &self.google_endpoint)
            .field(
                "google_access_token",
                &self.google_access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Config {
    /// AWS provider settings
    #[must_use]
    pub fn aws(&self) -> AwsConfig {
        AwsConfig {
            region: self.aws_region.clone(),
            assume_role: Some(self.aws_assume_role.trim())
                .filter(|role| !role.is_empty())
                .map(ToString::to_string),
            api_retries: self.aws_api_retries,
            endpoint_url: self.aws_endpoint_url.clone(),
        }
    }

    /// Azure provider settings
    #[must_use]
    pub fn azure(&self) -> AzureConfig {
        AzureConfig {
            key_vault: self.azure_key_vault.clone(),
            region: self.azure_region.clone(),
            resource_group: self.azure_resource_group.clone(),
            auth: self.azure_auth,
            client_id: self.azure_client_id.clone(),
        }
    }

    /// Google provider settings
    #[must_use]
    pub fn gcp(&self) -> GcpConfig {
        GcpConfig {
            project_id: self.google_project_id.clone(),
            secret_version: self.google_secret_version.clone(),
            endpoint: self.google_endpoint.clone(),
            credentials: match &self.google_access_token {
                Some(token) => GcpCredentialSource::AccessToken(token.clone()),
                None => GcpCredentialSource::MetadataServer,
            },
        }
    }
}
