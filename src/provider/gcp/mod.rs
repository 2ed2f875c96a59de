//! # GCP Secret Manager Client
//!
//! Native REST implementation for reading secret versions from Google Secret Manager
//! API v1, using reqwest with rustls.
//!
//! Authentication uses either the GCE/GKE metadata server (Workload Identity) or a
//! pre-issued OAuth2 access token.
//!
//! References:
//! - [GCP Secret Manager REST API v1](https://cloud.google.com/secret-manager/docs/reference/rest)

mod responses;
mod token;

use crate::config::GcpConfig;
use crate::provider::{SecretError, SecretProvider, SecretValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use responses::{AccessSecretVersionResponse, GcpErrorResponse};
use std::time::Instant;
use token::TokenSource;
use tracing::{debug, info, Instrument};

pub(crate) const PROVIDER: &str = "google";

/// Google Secret Manager provider implementation
pub struct GoogleSecretManager {
    http_client: Client,
    base_url: String,
    project_id: String,
    secret_version: String,
    tokens: TokenSource,
}

impl std::fmt::Debug for GoogleSecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSecretManager")
            .field("project_id", &self.project_id)
            .field("secret_version", &self.secret_version)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleSecretManager {
    /// Create a new Google Secret Manager client
    ///
    /// No token is requested here; the first fetch authenticates.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GcpConfig) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let tokens = TokenSource::new(http_client.clone(), config.credentials);
        let base_url = config.endpoint.trim_end_matches('/').to_string();

        info!(
            project_id = %config.project_id,
            secret_version = %config.secret_version,
            endpoint = %base_url,
            credentials = tokens.describe(),
            "Google Secret Manager provider initialized"
        );

        Ok(Self {
            http_client,
            base_url,
            project_id: config.project_id,
            secret_version: config.secret_version,
            tokens,
        })
    }

    /// Fetch metadata server tokens from `url` instead of the GCE metadata host
    #[must_use]
    pub fn with_metadata_token_url(mut self, url: impl Into<String>) -> Self {
        self.tokens.set_metadata_url(url.into());
        self
    }

    /// Resource path of the configured version of a secret
    ///
    /// Format: `projects/{project}/secrets/{secret}/versions/{version}`
    #[must_use]
    pub fn version_path(&self, secret_name: &str) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, secret_name, self.secret_version
        )
    }

    /// Reject names that would change the request path once interpolated
    fn validate_secret_name(secret_name: &str) -> Result<(), SecretError> {
        if secret_name.is_empty() || secret_name.contains(['/', '?', '#']) {
            return Err(SecretError::InvalidParameter {
                provider: PROVIDER,
                message: format!("invalid secret name '{secret_name}'"),
            });
        }
        Ok(())
    }

    fn access_url(&self, secret_name: &str) -> String {
        format!("{}/v1/{}:access", self.base_url, self.version_path(secret_name))
    }
}

#[async_trait]
impl SecretProvider for GoogleSecretManager {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn get_secret(&self, secret_name: &str) -> Result<SecretValue, SecretError> {
        let span = tracing::debug_span!(
            "gcp.secret.access",
            secret.name = secret_name,
            project.id = %self.project_id,
            secret.version = %self.secret_version
        );
        let start = Instant::now();

        async move {
            Self::validate_secret_name(secret_name)?;
            let token = self.tokens.access_token().await?;

            let response = self
                .http_client
                .get(self.access_url(secret_name))
                .bearer_auth(token.as_str())
                .send()
                .await
                .map_err(|e| SecretError::Transport {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(map_error_response(secret_name, status.as_u16(), &body));
            }

            let access: AccessSecretVersionResponse =
                response.json().await.map_err(|e| SecretError::Decode {
                    provider: PROVIDER,
                    name: secret_name.to_string(),
                    message: format!("failed to parse access response: {e}"),
                })?;

            let bytes = general_purpose::STANDARD
                .decode(access.payload.data.as_bytes())
                .map_err(|e| SecretError::Decode {
                    provider: PROVIDER,
                    name: secret_name.to_string(),
                    message: format!("payload is not valid base64: {e}"),
                })?;

            debug!(
                version = %access.name,
                duration_ms = start.elapsed().as_millis(),
                "Accessed GCP secret version"
            );

            Ok(match String::from_utf8(bytes) {
                Ok(text) => SecretValue::text(text),
                Err(e) => SecretValue::binary(e.into_bytes()),
            })
        }
        .instrument(span)
        .await
    }
}

/// Map a non-success response onto an error, preferring the canonical status
fn map_error_response(secret_name: &str, status: u16, body: &str) -> SecretError {
    let Ok(envelope) = serde_json::from_str::<GcpErrorResponse>(body) else {
        return SecretError::from_http_status(PROVIDER, secret_name, status, body.to_string());
    };

    let error = envelope.error;
    let message = format!("{} (code: {}, status: {})", error.message, error.code, error.status);
    match error.status.as_str() {
        "NOT_FOUND" => SecretError::NotFound {
            provider: PROVIDER,
            name: secret_name.to_string(),
            message,
        },
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => SecretError::PermissionDenied {
            provider: PROVIDER,
            message,
        },
        "INVALID_ARGUMENT" => SecretError::InvalidParameter {
            provider: PROVIDER,
            message,
        },
        // Disabled or destroyed versions
        "FAILED_PRECONDITION" => SecretError::InvalidRequest {
            provider: PROVIDER,
            message,
        },
        "INTERNAL" | "UNAVAILABLE" => SecretError::InternalService {
            provider: PROVIDER,
            message,
        },
        _ => SecretError::from_http_status(PROVIDER, secret_name, status, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GcpCredentialSource;

    fn provider(endpoint: &str) -> GoogleSecretManager {
        GoogleSecretManager::new(GcpConfig {
            project_id: "my-project".to_string(),
            secret_version: "latest".to_string(),
            endpoint: endpoint.to_string(),
            credentials: GcpCredentialSource::AccessToken("token".to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_version_path() {
        let gcp = provider("https://secretmanager.googleapis.com");
        assert_eq!(
            gcp.version_path("db-password"),
            "projects/my-project/secrets/db-password/versions/latest"
        );
    }

    #[test]
    fn test_access_url_trims_trailing_slash() {
        let gcp = provider("http://127.0.0.1:8080/");
        assert_eq!(
            gcp.access_url("db"),
            "http://127.0.0.1:8080/v1/projects/my-project/secrets/db/versions/latest:access"
        );
    }

    #[test]
    fn test_secret_name_must_stay_in_path() {
        assert!(GoogleSecretManager::validate_secret_name("db-password_2").is_ok());
        for name in ["", "a/b", "a?alt=json", "a#frag", "../other"] {
            let error = GoogleSecretManager::validate_secret_name(name).unwrap_err();
            assert_eq!(error.kind(), "invalid_parameter", "name '{name}'");
        }
    }

    #[test]
    fn test_error_envelope_status_wins() {
        let body = r#"{"error":{"code":400,"message":"Secret Version is in DISABLED state.","status":"FAILED_PRECONDITION"}}"#;
        assert_eq!(map_error_response("db", 400, body).kind(), "invalid_request");

        let body = r#"{"error":{"code":404,"message":"Secret [projects/1/secrets/db] not found or has no versions.","status":"NOT_FOUND"}}"#;
        assert_eq!(map_error_response("db", 404, body).kind(), "not_found");

        let body = r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(map_error_response("db", 403, body).kind(), "permission_denied");

        let body = r#"{"error":{"code":400,"message":"bad name","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(map_error_response("db", 400, body).kind(), "invalid_parameter");
    }

    #[test]
    fn test_unparseable_error_falls_back_to_http_status() {
        assert_eq!(
            map_error_response("db", 502, "<html>bad gateway</html>").kind(),
            "internal_service_error"
        );
        assert_eq!(map_error_response("db", 401, "").kind(), "permission_denied");
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", provider("https://secretmanager.googleapis.com"));
        assert!(rendered.contains("my-project"));
        assert!(!rendered.contains("token"));
    }
}
