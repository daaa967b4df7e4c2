//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - JSON vault file format with atomic writes (`format`)
//! - `SecretRecord` and `SecretMetadata` types (`secret`)
//! - The password canary (`canary`)
//! - Single-writer locking for the vault file (`lock`)
//! - `Vault` for bootstrap and password validation (`store`)
//! - `VaultSession`, the unlocked vault used by connectors (`session`)

pub mod canary;
pub mod format;
pub mod lock;
pub mod secret;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use format::VaultFile;
pub use secret::{SecretMetadata, SecretRecord};
pub use session::{validate_secret_name, VaultSession, VerifyReport};
pub use store::Vault;
