//! # cloud-secrets
//!
//! Periodically fetches one secret from AWS Secrets Manager, Azure Key Vault or
//! Google Secret Manager and reports the time of the last successful sync as a
//! Prometheus metric.
//!
//! Every flag can also be set through a `CLOUD_SECRETS_*` environment variable; see
//! `cloud-secrets --help`.

use anyhow::{Context, Result};
use clap::Parser;
use cloud_secrets::config::Config;
use cloud_secrets::runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate().context("Invalid configuration")?;
    runtime::run(config).await
}
