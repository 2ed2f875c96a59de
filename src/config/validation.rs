//! # Configuration Validation
//!
//! Checks that cannot be expressed through clap alone. Any failure here is fatal
//! at startup, before a provider is constructed or a sync is scheduled.

use super::{Config, ConfigError, ProviderKind};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Parse a bind address. `:7979` binds all interfaces on port 7979.
///
/// # Errors
/// Returns [`ConfigError::InvalidAddress`] if the value is not `host:port` or `:port`.
pub fn parse_bind_address(value: &str) -> Result<SocketAddr, ConfigError> {
    let trimmed = value.trim();

    if let Some(port) = trimmed.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason: format!("invalid port: {e}"),
        })?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    if let Some(port) = trimmed.strip_prefix("localhost:") {
        let port: u16 = port.parse().map_err(|e| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason: format!("invalid port: {e}"),
        })?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port));
    }

    trimmed
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_name.trim().is_empty() {
            return Err(ConfigError::MissingSecretName);
        }

        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        match self.provider {
            ProviderKind::Aws => {
                if self.aws_region.trim().is_empty() {
                    return Err(ConfigError::MissingProviderField {
                        provider: self.provider,
                        flag: "aws-region",
                    });
                }
            }
            ProviderKind::Azure => {
                if self.azure_key_vault.trim().is_empty() {
                    return Err(ConfigError::MissingProviderField {
                        provider: self.provider,
                        flag: "azure-key-vault",
                    });
                }
            }
            ProviderKind::Google => {
                if self.google_project_id.trim().is_empty() {
                    return Err(ConfigError::MissingProviderField {
                        provider: self.provider,
                        flag: "google-project-id",
                    });
                }
                if self.google_secret_version.trim().is_empty() {
                    return Err(ConfigError::MissingProviderField {
                        provider: self.provider,
                        flag: "google-secret-version",
                    });
                }
            }
        }

        Ok(())
    }
}
