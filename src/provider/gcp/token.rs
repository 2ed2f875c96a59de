//! OAuth2 access tokens for the Google REST API
//!
//! Tokens from the metadata server are cached and refreshed shortly before they expire.

use super::responses::TokenResponse;
use super::PROVIDER;
use crate::config::GcpCredentialSource;
use crate::constants::{GOOGLE_METADATA_TOKEN_URL, TOKEN_EXPIRY_MARGIN};
use crate::provider::SecretError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

/// Upper bound on how long a metadata server token is reused
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Expiry of a token issued at `now` and valid for `expires_in_secs`
fn token_expiry(now: Instant, expires_in_secs: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in_secs).min(MAX_TOKEN_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}

struct CachedToken {
    value: Zeroizing<String>,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

pub(crate) struct TokenSource {
    http_client: Client,
    credentials: GcpCredentialSource,
    metadata_url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub(crate) fn new(http_client: Client, credentials: GcpCredentialSource) -> Self {
        Self {
            http_client,
            credentials,
            metadata_url: GOOGLE_METADATA_TOKEN_URL.to_string(),
            cache: Mutex::new(None),
        }
    }

    pub(crate) fn set_metadata_url(&mut self, url: String) {
        self.metadata_url = url;
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self.credentials {
            GcpCredentialSource::MetadataServer => "metadata-server",
            GcpCredentialSource::AccessToken(_) => "access-token",
        }
    }

    /// Bearer token for the next request
    pub(crate) async fn access_token(&self) -> Result<Zeroizing<String>, SecretError> {
        match &self.credentials {
            GcpCredentialSource::AccessToken(token) => Ok(Zeroizing::new(token.clone())),
            GcpCredentialSource::MetadataServer => {
                // Held across the fetch so concurrent callers share one refresh
                let mut cache = self.cache.lock().await;
                if let Some(cached) = cache.as_ref().filter(|t| t.is_fresh(Instant::now())) {
                    return Ok(cached.value.clone());
                }

                let fetched = self.fetch_metadata_token().await?;
                let value = fetched.value.clone();
                *cache = Some(fetched);
                Ok(value)
            }
        }
    }

    async fn fetch_metadata_token(&self) -> Result<CachedToken, SecretError> {
        let response = self
            .http_client
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SecretError::Transport {
                provider: PROVIDER,
                message: format!("metadata server not available: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::PermissionDenied {
                provider: PROVIDER,
                message: format!("metadata server returned {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| SecretError::Unexpected {
            provider: PROVIDER,
            message: format!("failed to parse metadata server token response: {e}"),
        })?;

        debug!(
            expires_in = token.expires_in,
            "Retrieved access token from metadata server"
        );

        Ok(CachedToken {
            value: Zeroizing::new(token.access_token),
            expires_at: token_expiry(Instant::now(), token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_honours_margin() {
        let now = Instant::now();
        let token = |ttl: Duration| CachedToken {
            value: Zeroizing::new("t".to_string()),
            expires_at: now + ttl,
        };

        assert!(token(Duration::from_secs(3600)).is_fresh(now));
        assert!(!token(TOKEN_EXPIRY_MARGIN).is_fresh(now));
        assert!(!token(Duration::from_secs(10)).is_fresh(now));
    }

    #[test]
    fn test_token_expiry_is_capped() {
        let now = Instant::now();
        assert_eq!(token_expiry(now, 600), now + Duration::from_secs(600));
        assert_eq!(token_expiry(now, u64::MAX), now + MAX_TOKEN_LIFETIME);
    }

    #[tokio::test]
    async fn test_static_token_is_returned_as_is() {
        let source = TokenSource::new(
            Client::new(),
            GcpCredentialSource::AccessToken("ya29.static".to_string()),
        );
        assert_eq!(source.access_token().await.unwrap().as_str(), "ya29.static");
        assert_eq!(source.describe(), "access-token");
    }
}
