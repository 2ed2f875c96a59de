//! # Provider Modules
//!
//! Provider modules for the supported cloud secret managers.
//!
//! Each provider implements [`SecretProvider`] independently and owns its own
//! authenticated client. The provider is chosen once at startup by
//! [`build_provider`] and is not swappable afterwards.

use crate::config::{Config, ProviderKind};
use anyhow::Result;
use async_trait::async_trait;
use std::borrow::Cow;
use std::sync::Arc;
use zeroize::Zeroizing;

pub mod error;

pub mod aws;
pub mod azure;
pub mod gcp;

pub use error::SecretError;

/// Provider trait for cloud secret managers
#[async_trait]
pub trait SecretProvider: Send + Sync + std::fmt::Debug {
    /// Short provider name used in logs and metrics (e.g., "aws")
    fn provider_name(&self) -> &'static str;

    /// Fetch the current value of the named secret with a single backend call
    async fn get_secret(&self, secret_name: &str) -> Result<SecretValue, SecretError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Text,
    Binary,
}

/// A retrieved secret
///
/// The buffer is wiped when dropped. `Debug` and `Display` never print the content;
/// use [`SecretValue::reveal`] deliberately.
#[derive(Clone)]
pub struct SecretValue {
    bytes: Zeroizing<Vec<u8>>,
    encoding: Encoding,
}

impl SecretValue {
    #[must_use]
    pub fn text(value: String) -> Self {
        Self {
            bytes: Zeroizing::new(value.into_bytes()),
            encoding: Encoding::Text,
        }
    }

    #[must_use]
    pub fn binary(value: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(value),
            encoding: Encoding::Binary,
        }
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.encoding == Encoding::Binary
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The value as text, if it is valid UTF-8
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// The value as text; invalid UTF-8 in binary secrets is replaced
    #[must_use]
    pub fn reveal(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("encoding", &self.encoding)
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<redacted {} bytes>", self.bytes.len())
    }
}

/// Construct the provider selected in the configuration
///
/// # Errors
/// Returns an error if client or credential setup fails; this is fatal at startup.
pub async fn build_provider(config: &Config) -> Result<Arc<dyn SecretProvider>> {
    let provider: Arc<dyn SecretProvider> = match config.provider {
        ProviderKind::Aws => Arc::new(aws::AwsSecretsManager::new(&config.aws()).await?),
        ProviderKind::Azure => Arc::new(azure::AzureKeyVault::new(&config.azure())?),
        ProviderKind::Google => Arc::new(gcp::GoogleSecretManager::new(config.gcp())?),
    };
    Ok(provider)
}
