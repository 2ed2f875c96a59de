//! # Provider Errors
//!
//! Tagged failure conditions for a single secret fetch. Providers translate their
//! SDK or HTTP errors into one of these variants instead of passing raw provider
//! exception text upward.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("{provider}: secret '{name}' not found: {message}")]
    NotFound {
        provider: &'static str,
        name: String,
        message: String,
    },
    #[error("{provider}: failed to decrypt secret '{name}': {message}")]
    DecryptionFailure {
        provider: &'static str,
        name: String,
        message: String,
    },
    #[error("{provider}: invalid parameter: {message}")]
    InvalidParameter {
        provider: &'static str,
        message: String,
    },
    #[error("{provider}: invalid request: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },
    #[error("{provider}: permission denied: {message}")]
    PermissionDenied {
        provider: &'static str,
        message: String,
    },
    #[error("{provider}: internal service error: {message}")]
    InternalService {
        provider: &'static str,
        message: String,
    },
    #[error("{provider}: transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    #[error("{provider}: failed to decode secret '{name}': {message}")]
    Decode {
        provider: &'static str,
        name: String,
        message: String,
    },
    #[error("{provider}: {message}")]
    Unexpected {
        provider: &'static str,
        message: String,
    },
}

impl SecretError {
    /// Stable label for logs and the `result` metric label
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SecretError::NotFound { .. } => "not_found",
            SecretError::DecryptionFailure { .. } => "decryption_failure",
            SecretError::InvalidParameter { .. } => "invalid_parameter",
            SecretError::InvalidRequest { .. } => "invalid_request",
            SecretError::PermissionDenied { .. } => "permission_denied",
            SecretError::InternalService { .. } => "internal_service_error",
            SecretError::Transport { .. } => "transport_error",
            SecretError::Decode { .. } => "decode_error",
            SecretError::Unexpected { .. } => "unexpected",
        }
    }

    /// Name of the provider that produced the error
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match self {
            SecretError::NotFound { provider, .. }
            | SecretError::DecryptionFailure { provider, .. }
            | SecretError::InvalidParameter { provider, .. }
            | SecretError::InvalidRequest { provider, .. }
            | SecretError::PermissionDenied { provider, .. }
            | SecretError::InternalService { provider, .. }
            | SecretError::Transport { provider, .. }
            | SecretError::Decode { provider, .. }
            | SecretError::Unexpected { provider, .. } => provider,
        }
    }

    /// Map an HTTP error status from a REST backend onto an error condition
    #[must_use]
    pub fn from_http_status(
        provider: &'static str,
        name: &str,
        status: u16,
        message: String,
    ) -> Self {
        match status {
            400 | 409 | 412 => SecretError::InvalidRequest { provider, message },
            401 | 403 => SecretError::PermissionDenied { provider, message },
            404 => SecretError::NotFound {
                provider,
                name: name.to_string(),
                message,
            },
            500..=599 => SecretError::InternalService { provider, message },
            _ => SecretError::Unexpected {
                provider,
                message: format!("HTTP {status}: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        let cases = [
            (400, "invalid_request"),
            (401, "permission_denied"),
            (403, "permission_denied"),
            (404, "not_found"),
            (500, "internal_service_error"),
            (503, "internal_service_error"),
            (418, "unexpected"),
        ];

        for (status, expected) in cases {
            let error = SecretError::from_http_status("google", "db-password", status, "boom".into());
            assert_eq!(error.kind(), expected, "status {status}");
            assert_eq!(error.provider(), "google");
        }
    }

    #[test]
    fn test_not_found_message_names_the_secret() {
        let error = SecretError::from_http_status("azure", "db-password", 404, "gone".into());
        assert_eq!(
            error.to_string(),
            "azure: secret 'db-password' not found: gone"
        );
    }
}
