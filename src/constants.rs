//! # Constants
//!
//! Shared constants used throughout the application.
//!
//! Defaults here back the CLI flags in [`crate::config`]; every one of them can
//! be overridden by a flag or the matching `CLOUD_SECRETS_*` environment variable.

use std::time::Duration;

/// Window used to batch bursts of startup triggers before the first sync
pub const MIN_INTERVAL: Duration = Duration::from_secs(5);

/// Period of the driver loop wake-up
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default interval between two consecutive synchronizations
pub const DEFAULT_INTERVAL: &str = "1m";

/// Default bind address for the metrics and health check endpoint
pub const DEFAULT_METRICS_ADDRESS: &str = ":7979";

/// Default AWS region
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Default maximum number of AWS API retries
pub const DEFAULT_AWS_API_RETRIES: u32 = 3;

/// AWS version stage holding the current secret value
pub const AWS_CURRENT_VERSION_STAGE: &str = "AWSCURRENT";

/// Default Azure region
pub const DEFAULT_AZURE_REGION: &str = "centralus";

/// DNS suffix of Key Vault in the Azure public cloud
pub const AZURE_KEY_VAULT_DNS_SUFFIX: &str = "vault.azure.net";

/// Default Google secret version alias
pub const DEFAULT_GOOGLE_SECRET_VERSION: &str = "latest";

/// Google Secret Manager REST endpoint
pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// GCE/GKE metadata server token endpoint (Workload Identity)
pub const GOOGLE_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh cached access tokens this long before they expire
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
