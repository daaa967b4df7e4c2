//! Key material types: the per-vault salt and the session key.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Random salt generated once per vault at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Generate a fresh random salt.
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        Self(salt)
    }

    /// Rebuild a salt read back from a vault file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            CredVaultError::InvalidVaultFormat(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

/// The symmetric key derived from (password, salt).
///
/// Lives only in memory for the session; zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build the AEAD cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_salts_differ() {
        assert_ne!(Salt::generate(), Salt::generate());
    }

    #[test]
    fn salt_from_bytes_checks_length() {
        assert!(Salt::from_bytes(&[0u8; SALT_LEN]).is_ok());
        assert!(matches!(
            Salt::from_bytes(&[0u8; 16]),
            Err(CredVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn derived_key_debug_hides_bytes() {
        let key = DerivedKey::from_bytes([0x42; KEY_LEN]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("66"));
    }
}
