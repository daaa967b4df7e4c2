//! The password canary.
//!
//! A known plaintext sealed under the vault key at bootstrap.  Decrypting it
//! is how a candidate password is checked without touching real credentials.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::{cipher, DerivedKey};
use crate::errors::{CredVaultError, Result};

/// Record name of the canary inside the vault's `secrets` map.
pub const CANARY_NAME: &str = "__canary__";

/// The plaintext every canary must decrypt to.
const CANARY_PLAINTEXT: &str = "credvault-canary-v1";

/// Prefix reserved for internal records such as the canary.
const RESERVED_PREFIX: &str = "__";

/// Returns `true` for names callers may not use for credentials.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Seal a fresh canary under `key`.
pub fn seal(key: &DerivedKey) -> Result<Vec<u8>> {
    cipher::encrypt(key, CANARY_NAME, CANARY_PLAINTEXT)
}

/// Check a stored canary against `key`.
///
/// An integrity failure means "wrong password" and becomes `Ok(false)`.
pub fn verify(key: &DerivedKey, blob: &[u8]) -> Result<bool> {
    match cipher::decrypt(key, CANARY_NAME, blob) {
        Ok(value) => {
            let revealed = Zeroizing::new(value.reveal());
            Ok(bool::from(
                revealed.as_bytes().ct_eq(CANARY_PLAINTEXT.as_bytes()),
            ))
        }
        Err(CredVaultError::Integrity) => Ok(false),
        Err(e) => Err(e),
    }
}
