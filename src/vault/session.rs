//! The unlocked vault.
//!
//! A `VaultSession` is created once at startup (by `Vault::bootstrap` or
//! `Vault::unlock`) and passed by reference to every component that needs
//! a credential.  It owns the derived key; dropping the session zeroes it.
//!
//! `encrypt`/`decrypt` only read the key, so a shared `&VaultSession` can be
//! used from several threads at once.  Methods that change the file take
//! the write lock for the whole read-modify-write cycle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::canary::{self, CANARY_NAME};
use super::format::{self, VaultFile};
use super::lock::WriteLock;
use super::secret::{SecretMetadata, SecretRecord};
use crate::crypto::{cipher, derive_key, Argon2Params, DerivedKey, Salt};
use crate::errors::{CredVaultError, Result};
use crate::guard::{Password, Plaintext, SecretValue};

/// Longest accepted secret name, in bytes.
const MAX_NAME_LEN: usize = 256;

/// Outcome of `VaultSession::verify_all`.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Credentials that decrypted cleanly.
    pub ok: Vec<String>,
    /// Credentials that failed the integrity check.
    pub failed: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An unlocked vault holding the session key.
#[derive(Debug)]
pub struct VaultSession {
    path: PathBuf,
    salt: Salt,
    kdf: Argon2Params,
    key: DerivedKey,
    lock: WriteLock,
}

impl VaultSession {
    pub(crate) fn new(
        path: PathBuf,
        salt: Salt,
        kdf: Argon2Params,
        key: DerivedKey,
        lock: WriteLock,
    ) -> Self {
        Self {
            path,
            salt,
            kdf,
            key,
            lock,
        }
    }

    /// Change how long writers wait for the vault write lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock.set_timeout(timeout);
        self
    }

    // ------------------------------------------------------------------
    // Cipher operations
    // ------------------------------------------------------------------

    /// Encrypt a credential for `name` under the session key.
    ///
    /// Taking `Plaintext` means every caller that persists the blob itself
    /// has gone through the write-boundary trim.
    pub fn encrypt(&self, name: &str, plaintext: &Plaintext) -> Result<Vec<u8>> {
        validate_secret_name(name)?;
        cipher::encrypt(&self.key, name, plaintext.as_str())
    }

    /// Decrypt a blob produced for `name`.
    pub fn decrypt(&self, name: &str, blob: &[u8]) -> Result<SecretValue> {
        validate_secret_name(name)?;
        cipher::decrypt(&self.key, name, blob)
    }

    // ------------------------------------------------------------------
    // Stored credentials
    // ------------------------------------------------------------------

    /// Add or update a credential.
    ///
    /// Returns `true` when an existing credential was replaced.  The
    /// original `created_at` is kept on update.
    pub fn store_secret(&self, name: &str, value: &Plaintext) -> Result<bool> {
        let ciphertext = self.encrypt(name, value)?;

        let _guard = self.lock.acquire()?;
        let mut file = self.read_current()?;

        let replaced = match file.secrets.get_mut(name) {
            Some(record) => {
                record.replace(ciphertext);
                true
            }
            None => {
                file.secrets
                    .insert(name.to_string(), SecretRecord::new(ciphertext));
                false
            }
        };

        format::write_vault(&self.path, &file)?;
        debug!(secret = name, replaced, "credential stored");
        Ok(replaced)
    }

    /// Decrypt a stored credential.
    ///
    /// An integrity failure here is a hard error: the caller must not fall
    /// back to a default value.
    pub fn load_secret(&self, name: &str) -> Result<SecretValue> {
        validate_secret_name(name)?;
        let file = self.read_current()?;
        let record = file
            .secrets
            .get(name)
            .ok_or_else(|| CredVaultError::SecretNotFound(name.to_string()))?;

        cipher::decrypt(&self.key, name, &record.ciphertext).map_err(|e| {
            warn!(secret = name, "stored credential failed integrity check");
            e
        })
    }

    /// Remove a credential, e.g. when its connector configuration is deleted.
    pub fn remove_secret(&self, name: &str) -> Result<()> {
        validate_secret_name(name)?;

        let _guard = self.lock.acquire()?;
        let mut file = self.read_current()?;
        if file.secrets.remove(name).is_none() {
            return Err(CredVaultError::SecretNotFound(name.to_string()));
        }
        format::write_vault(&self.path, &file)?;

        debug!(secret = name, "credential removed");
        Ok(())
    }

    /// Returns `true` if a credential with this name is stored.
    ///
    /// Metadata-only check; nothing is decrypted.
    pub fn contains(&self, name: &str) -> Result<bool> {
        validate_secret_name(name)?;
        Ok(self.read_current()?.secrets.contains_key(name))
    }

    /// List metadata for all credentials, sorted by name.  Excludes the canary.
    pub fn list_secrets(&self) -> Result<Vec<SecretMetadata>> {
        let file = self.read_current()?;
        // BTreeMap iteration is already sorted by name.
        Ok(file
            .secrets
            .iter()
            .filter(|(name, _)| !canary::is_reserved(name))
            .map(|(name, record)| SecretMetadata {
                name: name.clone(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
            .collect())
    }

    /// Try to decrypt every stored credential and report which ones fail.
    pub fn verify_all(&self) -> Result<VerifyReport> {
        let file = self.read_current()?;
        let mut report = VerifyReport::default();

        for (name, record) in &file.secrets {
            if canary::is_reserved(name) {
                continue;
            }
            match cipher::decrypt(&self.key, name, &record.ciphertext) {
                Ok(_) => report.ok.push(name.clone()),
                Err(CredVaultError::Integrity) => report.failed.push(name.clone()),
                Err(e) => return Err(e),
            }
        }

        info!(
            ok = report.ok.len(),
            failed = report.failed.len(),
            "verified stored credentials"
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Password rotation
    // ------------------------------------------------------------------

    /// Re-encrypt the whole vault under a new password.
    ///
    /// Generates a new salt, derives a new key, re-seals the canary and
    /// every credential, and writes the result in one atomic rename, so no
    /// ciphertext of the old salt survives.  Returns a session for the new
    /// password.
    ///
    /// On error nothing was written and `self` is still usable, so the call
    /// can be retried.  After success `self` is stale.
    pub fn rotate_password(
        &self,
        new_password: &Password,
        params: &Argon2Params,
    ) -> Result<VaultSession> {
        let new_salt = Salt::generate();
        let new_key = derive_key(new_password, &new_salt, params)?;

        let count = {
            let _guard = self.lock.acquire()?;
            let mut file = self.read_current()?;

            for (name, record) in file.secrets.iter_mut() {
                record.ciphertext = if name == CANARY_NAME {
                    canary::seal(&new_key)?
                } else {
                    let plaintext =
                        Zeroizing::new(cipher::decrypt(&self.key, name, &record.ciphertext)?.reveal());
                    cipher::encrypt(&new_key, name, &plaintext)?
                };
            }

            file.salt = new_salt.as_bytes().to_vec();
            file.kdf = *params;
            format::write_vault(&self.path, &file)?;
            file.secrets.len().saturating_sub(1)
        };

        info!(path = %self.path.display(), credentials = count, "vault password rotated");

        Ok(VaultSession::new(
            self.path.clone(),
            new_salt,
            *params,
            new_key,
            WriteLock::new(&self.path, self.lock.timeout()),
        ))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// KDF parameters in effect for this session's key.
    pub fn kdf_params(&self) -> &Argon2Params {
        &self.kdf
    }

    /// Read the file and make sure it is still keyed by this session's salt.
    fn read_current(&self) -> Result<VaultFile> {
        let file = format::read_vault(&self.path)?;
        if file.salt.as_slice() != self.salt.as_bytes() {
            return Err(CredVaultError::StaleSession(self.path.clone()));
        }
        Ok(file)
    }
}

/// Validate that a credential name is safe.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, at most 256 characters, and must not use the
/// reserved `__` prefix.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CredVaultError::InvalidInput(
            "secret name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CredVaultError::InvalidInput(format!(
            "secret name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if canary::is_reserved(name) {
        return Err(CredVaultError::InvalidInput(format!(
            "secret name '{name}' uses the reserved '__' prefix"
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(CredVaultError::InvalidInput(format!(
            "secret name '{name}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
