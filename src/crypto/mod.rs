//! Cryptographic primitives for credvault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - Salt and session-key types (`keys`)
//! - AES-256-GCM encryption bound to a secret name (`cipher`)

pub mod cipher;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use cipher::{decrypt, encrypt};
pub use kdf::{derive_key, Argon2Params};
pub use keys::{DerivedKey, Salt};
