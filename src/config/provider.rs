//! # Provider Configuration
//!
//! Backend-specific settings handed to each provider constructor.

use crate::constants::AZURE_KEY_VAULT_DNS_SUFFIX;
use clap::ValueEnum;

/// AWS Secrets Manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// AWS region (e.g., "us-east-1", "eu-west-1")
    pub region: String,
    /// IAM role ARN assumed on top of the default credential chain
    /// Format: arn:aws:iam::<account-id>:role/<role-name>
    pub assume_role: Option<String>,
    /// Retries after the first attempt, handled by the SDK
    pub api_retries: u32,
    /// Override of the Secrets Manager endpoint
    pub endpoint_url: Option<String>,
}

/// Azure authentication method
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AzureAuthMethod {
    /// Reuse the session of a logged-in Azure CLI (`az login`)
    Cli,
    /// Managed Identity (AKS, App Service, VMs)
    ManagedIdentity,
    /// Workload Identity federation (AKS with Workload Identity enabled)
    WorkloadIdentity,
}

/// Azure Key Vault configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConfig {
    /// Key Vault name, or a full `https://` vault URL
    pub key_vault: String,
    pub region: String,
    pub resource_group: String,
    pub auth: AzureAuthMethod,
    /// Client ID of the managed or workload identity
    pub client_id: Option<String>,
}

impl AzureConfig {
    /// Vault URL for the configured vault
    ///
    /// Format: `https://{vault-name}.vault.azure.net/`. Full URLs are passed through.
    #[must_use]
    pub fn vault_url(&self) -> String {
        let vault = self.key_vault.trim();
        if vault.starts_with("https://") || vault.starts_with("http://") {
            if vault.ends_with('/') {
                vault.to_string()
            } else {
                format!("{vault}/")
            }
        } else {
            format!("https://{vault}.{AZURE_KEY_VAULT_DNS_SUFFIX}/")
        }
    }
}

/// Where the Google provider gets its OAuth2 access token from
#[derive(Clone, PartialEq, Eq)]
pub enum GcpCredentialSource {
    /// GCE/GKE metadata server (Workload Identity)
    MetadataServer,
    /// Pre-issued access token, e.g. from `gcloud auth print-access-token`
    AccessToken(String),
}

impl std::fmt::Debug for GcpCredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GcpCredentialSource::MetadataServer => f.write_str("MetadataServer"),
            GcpCredentialSource::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Google Secret Manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpConfig {
    pub project_id: String,
    /// Version number or alias such as `latest`
    pub secret_version: String,
    /// REST endpoint, without the `/v1` suffix
    pub endpoint: String,
    pub credentials: GcpCredentialSource,
}
