//! AES-256-GCM authenticated encryption of a single named secret.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce from the
//! OS CSPRNG and prepends it to the ciphertext.  The secret's name is fed
//! to GCM as associated data, so a blob only opens under the name it was
//! sealed for.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroize;

use super::keys::DerivedKey;
use crate::errors::{CredVaultError, Result};
use crate::guard::SecretValue;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, bound to `name`.
///
/// Any plaintext is accepted, including the empty string.
pub fn encrypt(key: &DerivedKey, name: &str, plaintext: &str) -> Result<Vec<u8>> {
    require_name(name)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CredVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let payload = Payload {
        msg: plaintext.as_bytes(),
        aad: name.as_bytes(),
    };
    let ciphertext = cipher
        .encrypt(&nonce, payload)
        .map_err(|e| CredVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a blob produced by `encrypt` for the same `name`.
///
/// A truncated or corrupted blob, a different key, and a different name
/// all fail with the same `Integrity` error.
pub fn decrypt(key: &DerivedKey, name: &str, blob: &[u8]) -> Result<SecretValue> {
    require_name(name)?;

    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(CredVaultError::Integrity);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CredVaultError::Integrity)?;

    let payload = Payload {
        msg: ciphertext,
        aad: name.as_bytes(),
    };
    let plaintext = cipher
        .decrypt(nonce, payload)
        .map_err(|_| CredVaultError::Integrity)?;

    // Only `encrypt` produces these blobs and it only takes &str, so bad
    // UTF-8 after a successful tag check means the blob is not ours.
    let value = String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        CredVaultError::Integrity
    })?;

    Ok(SecretValue::new(value))
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CredVaultError::InvalidInput(
            "secret name cannot be empty".into(),
        ));
    }
    Ok(())
}
