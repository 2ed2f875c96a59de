//! # Azure Providers
//!
//! - `key_vault`: Azure Key Vault secrets

pub mod key_vault;

pub use key_vault::AzureKeyVault;
