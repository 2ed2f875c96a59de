//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use cloud_secrets::prelude::*;
//! ```

pub use crate::config::{Config, LogFormat, ProviderKind};

pub use crate::controller::{Controller, RunSchedule, SyncOutcome};

pub use crate::observability::metrics::Metrics;

pub use crate::provider::{SecretError, SecretProvider, SecretValue};

pub use crate::provider::aws::AwsSecretsManager;
pub use crate::provider::azure::AzureKeyVault;
pub use crate::provider::gcp::GoogleSecretManager;
