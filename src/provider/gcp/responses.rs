//! GCP Secret Manager REST API response payloads
//!
//! API Reference: https://cloud.google.com/secret-manager/docs/reference/rest

use serde::Deserialize;

/// Response from accessing a secret version
///
/// Returned by `GET /v1/projects/{project}/secrets/{secret}/versions/{version}:access`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessSecretVersionResponse {
    /// Resolved resource name, e.g. `projects/p/secrets/s/versions/3`
    #[serde(default)]
    pub name: String,
    pub payload: SecretPayload,
}

/// Secret payload; `data` is base64-encoded
#[derive(Debug, Deserialize)]
pub(crate) struct SecretPayload {
    #[serde(default)]
    pub data: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
pub(crate) struct GcpErrorResponse {
    pub error: GcpError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GcpError {
    /// HTTP status code (e.g., 404, 403, 500)
    pub code: u16,
    pub message: String,
    /// Canonical status (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    #[serde(default)]
    pub status: String,
}

/// OAuth2 access token from the metadata server
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}
