//! Cloud Secrets Library
//!
//! Periodically retrieves a named secret from AWS Secrets Manager, Azure Key Vault
//! or Google Secret Manager and reports the last successful sync as a Prometheus gauge.
//!
//! The interesting part is the throttled reconciliation loop in [`controller`]: it
//! decides *when* a fetch runs. The fetch itself lives behind the
//! [`provider::SecretProvider`] trait, one implementation per backend.
//!
//! ## Quick Start
//!
//! ```rust
//! use cloud_secrets::prelude::*;
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
