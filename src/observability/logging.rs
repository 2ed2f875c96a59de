//! # Logging
//!
//! Installs the global tracing subscriber. `RUST_LOG`, when set, takes precedence
//! over the configured level.

use crate::config::{LogFormat, LogLevel};
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub fn default_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(level.as_filter_directive())
}

/// Initialize the global subscriber
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: LogLevel) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .try_init(),
    }
    .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
