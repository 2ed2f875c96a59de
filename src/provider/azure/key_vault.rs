//! # Azure Key Vault Client
//!
//! Client for reading secrets from the Azure Key Vault Secrets API.
//!
//! This module provides functionality to:
//! - Retrieve the latest version of a secret
//! - Authenticate with the Azure CLI session, Managed Identity or Workload Identity

use crate::config::{AzureAuthMethod, AzureConfig};
use crate::provider::{SecretError, SecretProvider, SecretValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::TokenCredential;
use azure_identity::{
    AzureCliCredential, ManagedIdentityCredential, ManagedIdentityCredentialOptions,
    UserAssignedId, WorkloadIdentityCredential, WorkloadIdentityCredentialOptions,
};
use azure_security_keyvault_secrets::models::Secret;
use azure_security_keyvault_secrets::SecretClient;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, Instrument};

const PROVIDER: &str = "azure";

/// Azure Key Vault provider implementation
pub struct AzureKeyVault {
    client: SecretClient,
    vault_url: String,
}

impl std::fmt::Debug for AzureKeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureKeyVault")
            .field("vault_url", &self.vault_url)
            .finish_non_exhaustive()
    }
}

impl AzureKeyVault {
    /// Create a new Azure Key Vault client
    ///
    /// # Errors
    /// Returns an error if the credential or the `SecretClient` cannot be created.
    pub fn new(config: &AzureConfig) -> Result<Self> {
        let vault_url = config.vault_url();
        let credential = build_credential(config)?;

        let client = SecretClient::new(&vault_url, credential, None)
            .context("Failed to create Azure Key Vault SecretClient")?;

        info!(
            vault_url = %vault_url,
            region = %config.region,
            resource_group = %config.resource_group,
            "Azure Key Vault provider initialized"
        );

        Ok(Self { client, vault_url })
    }

    fn vault_name(&self) -> &str {
        self.vault_url
            .strip_prefix("https://")
            .and_then(|s| s.split('.').next())
            .unwrap_or("unknown")
    }
}

fn build_credential(config: &AzureConfig) -> Result<Arc<dyn TokenCredential>> {
    let credential: Arc<dyn TokenCredential> = match config.auth {
        AzureAuthMethod::Cli => {
            info!("Using Azure CLI authentication");
            AzureCliCredential::new(None).context("Failed to create AzureCliCredential")?
        }
        AzureAuthMethod::ManagedIdentity => {
            let options = config.client_id.as_ref().map(|client_id| {
                info!(client_id = %client_id, "Using user-assigned Managed Identity");
                ManagedIdentityCredentialOptions {
                    user_assigned_id: Some(UserAssignedId::ClientId(client_id.clone())),
                    ..Default::default()
                }
            });
            if options.is_none() {
                info!("Using system-assigned Managed Identity");
            }
            ManagedIdentityCredential::new(options)
                .context("Failed to create ManagedIdentityCredential")?
        }
        AzureAuthMethod::WorkloadIdentity => {
            // Without a client id the credential falls back to AZURE_CLIENT_ID
            info!(
                client_id = config.client_id.as_deref().unwrap_or("<from AZURE_CLIENT_ID>"),
                "Using Azure Workload Identity authentication"
            );
            let options = WorkloadIdentityCredentialOptions {
                client_id: config.client_id.clone(),
                ..Default::default()
            };
            WorkloadIdentityCredential::new(Some(options))
                .context("Failed to create WorkloadIdentityCredential")?
        }
    };
    Ok(credential)
}

#[async_trait]
impl SecretProvider for AzureKeyVault {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_secret(&self, secret_name: &str) -> Result<SecretValue, SecretError> {
        let span = tracing::debug_span!(
            "azure.keyvault.secret.get",
            secret.name = secret_name,
            vault.name = self.vault_name()
        );
        let start = Instant::now();

        async move {
            // No version parameter: the latest version is returned
            let response = self
                .client
                .get_secret(secret_name, None)
                .await
                .map_err(|e| classify_error(secret_name, &e.to_string()))?;

            let secret = serde_json::from_slice::<Secret>(&response.into_body()).map_err(|e| {
                SecretError::Decode {
                    provider: PROVIDER,
                    name: secret_name.to_string(),
                    message: format!("failed to deserialize Key Vault response: {e}"),
                }
            })?;

            debug!(
                duration_ms = start.elapsed().as_millis(),
                "Retrieved Azure secret"
            );

            secret
                .value
                .map(SecretValue::text)
                .ok_or_else(|| SecretError::Decode {
                    provider: PROVIDER,
                    name: secret_name.to_string(),
                    message: "Key Vault response has no value".to_string(),
                })
        }
        .instrument(span)
        .await
    }
}

/// Classify a Key Vault client error from its rendered message
fn classify_error(secret_name: &str, message: &str) -> SecretError {
    let message = message.to_string();
    let contains = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if contains(&["SecretNotFound", "404", "not found"]) {
        SecretError::NotFound {
            provider: PROVIDER,
            name: secret_name.to_string(),
            message,
        }
    } else if contains(&["Forbidden", "Unauthorized", "401", "403"]) {
        SecretError::PermissionDenied {
            provider: PROVIDER,
            message,
        }
    } else if contains(&["SecretDisabled", "BadParameter", "400"]) {
        SecretError::InvalidRequest {
            provider: PROVIDER,
            message,
        }
    } else if contains(&["500", "502", "503", "504", "InternalServerError"]) {
        SecretError::InternalService {
            provider: PROVIDER,
            message,
        }
    } else if contains(&["credential", "az login", "AzureCliCredential"]) {
        SecretError::PermissionDenied {
            provider: PROVIDER,
            message,
        }
    } else if contains(&["dns", "connect", "timed out", "Io error"]) {
        SecretError::Transport {
            provider: PROVIDER,
            message,
        }
    } else {
        SecretError::Unexpected {
            provider: PROVIDER,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let error = classify_error(
            "db-password",
            "HttpResponse(NotFound, \"SecretNotFound\"): A secret with (name/id) db-password was not found",
        );
        assert_eq!(error.kind(), "not_found");
        assert_eq!(error.provider(), "azure");
    }

    #[test]
    fn test_classify_forbidden() {
        let error = classify_error("db", "HttpResponse(Forbidden, \"Forbidden\"): caller is not authorized");
        assert_eq!(error.kind(), "permission_denied");
    }

    #[test]
    fn test_classify_disabled_secret() {
        let error = classify_error("db", "HttpResponse(BadRequest, \"SecretDisabled\"): operation get is not allowed");
        assert_eq!(error.kind(), "invalid_request");
    }

    #[test]
    fn test_classify_server_error() {
        let error = classify_error("db", "HttpResponse(ServiceUnavailable, \"503\")");
        assert_eq!(error.kind(), "internal_service_error");
    }

    #[test]
    fn test_classify_missing_cli_login() {
        let error = classify_error("db", "AzureCliCredential authentication failed. Please run 'az login'");
        assert_eq!(error.kind(), "permission_denied");
    }

    #[test]
    fn test_classify_connection_failure() {
        let error = classify_error("db", "Io error: failed to connect to host");
        assert_eq!(error.kind(), "transport_error");
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_error("db", "something odd").kind(), "unexpected");
    }
}
