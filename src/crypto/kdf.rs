//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects a stolen vault file against
//! brute-force and GPU-based attacks.  Parameters are configurable via
//! `Argon2Params` (loaded from `.credvault.toml` or sensible defaults) and
//! are stored in the vault file so every later run derives the same key.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::keys::{DerivedKey, Salt, KEY_LEN};
use crate::errors::{CredVaultError, Result};
use crate::guard::Password;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Largest memory cost accepted from a file, in KiB (4 GB).
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Largest iteration count accepted from a file.
pub const MAX_ITERATIONS: u32 = 64;

/// Largest lane count accepted from a file.
pub const MAX_PARALLELISM: u32 = 64;

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The weakest parameters `derive_key` accepts.  Handy for tests.
    pub const MINIMUM: Self = Self {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    };

    /// Reject dangerously weak settings, and settings so large that deriving
    /// a key would exhaust memory or never finish.
    ///
    /// Must run before `derive_key` allocates anything: the values come from
    /// unauthenticated files.
    pub fn check(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(CredVaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.memory_kib > MAX_MEMORY_KIB {
            return Err(CredVaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at most {MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(CredVaultError::KeyDerivationFailed(format!(
                "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(CredVaultError::KeyDerivationFailed(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive the session key from a password and the vault salt.
///
/// The same password + salt + params always produce the same key.  There is
/// no wrong-password detection here; that happens against the canary.
pub fn derive_key(password: &Password, salt: &Salt, params: &Argon2Params) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(CredVaultError::InvalidInput(
            "password cannot be empty".into(),
        ));
    }
    params.check()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CredVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut bytes = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut bytes)
        .map_err(|e| CredVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    let key = DerivedKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}
