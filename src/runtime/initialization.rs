//! Process-wide setup that must happen before anything else runs.

use crate::config::Config;
use crate::observability::init_logging;
use anyhow::Result;
use rustls::crypto::{ring, CryptoProvider};
use tracing::{info, warn};

/// Install ring as the rustls crypto provider, unless one is already installed
pub fn install_crypto_provider() {
    if CryptoProvider::get_default().is_none() {
        // Losing the race to another installer is fine, any default works
        let _ = ring::default_provider().install_default();
    }
}

/// Install the crypto provider and logging, then log the startup banner
///
/// # Errors
/// Returns an error if logging cannot be initialized.
pub fn initialize(config: &Config) -> Result<()> {
    install_crypto_provider();
    init_logging(config.log_format, config.log_level)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("BUILD_GIT_HASH"),
        built = env!("BUILD_DATETIME"),
        "Starting cloud-secrets"
    );
    info!(config = ?config, "Configuration loaded");

    if config.reveal_secret {
        warn!("Secret reveal is enabled; the secret value is logged at debug level");
    }

    Ok(())
}
