//! Vault bootstrap and password validation.
//!
//! `Vault` is the *locked* view of a vault file: it can be bootstrapped,
//! opened, and asked whether a password is correct.  Unlocking it yields a
//! `VaultSession`, which holds the derived key and does the real work.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::canary::{self, CANARY_NAME};
use super::format::{self, VaultFile};
use super::lock::{WriteLock, DEFAULT_LOCK_TIMEOUT};
use super::secret::SecretRecord;
use super::session::VaultSession;
use crate::crypto::{derive_key, Argon2Params, DerivedKey, Salt};
use crate::errors::{CredVaultError, Result};
use crate::guard::Password;

/// A vault file that has been read but not unlocked.
#[derive(Debug)]
pub struct Vault {
    path: PathBuf,
    file: VaultFile,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Initialize a brand-new vault at `path`.
    ///
    /// Generates the salt, derives the key, seals the canary, and persists
    /// all three.  Runs once per vault lifetime: a file that already carries
    /// a salt or a canary is refused with `AlreadyInitialized`.
    pub fn bootstrap(
        path: &Path,
        password: &Password,
        params: &Argon2Params,
    ) -> Result<VaultSession> {
        Self::bootstrap_with_timeout(path, password, params, DEFAULT_LOCK_TIMEOUT)
    }

    /// `bootstrap` with an explicit write-lock timeout.
    pub fn bootstrap_with_timeout(
        path: &Path,
        password: &Password,
        params: &Argon2Params,
        lock_timeout: std::time::Duration,
    ) -> Result<VaultSession> {
        let lock = WriteLock::new(path, lock_timeout);
        let salt = Salt::generate();

        let key = {
            let _guard = lock.acquire()?;

            // Keep unknown fields of a stub file; refuse anything initialized.
            let extra = if path.exists() {
                let existing = format::read_vault(path)?;
                if !existing.salt.is_empty() || existing.secrets.contains_key(CANARY_NAME) {
                    return Err(CredVaultError::AlreadyInitialized(path.to_path_buf()));
                }
                existing.extra
            } else {
                serde_json::Map::new()
            };

            let key = derive_key(password, &salt, params)?;

            let mut file = VaultFile::new(salt.as_bytes().to_vec(), *params);
            file.extra = extra;
            file.secrets
                .insert(CANARY_NAME.to_string(), SecretRecord::new(canary::seal(&key)?));

            format::write_vault(path, &file)?;
            key
        };

        info!(path = %path.display(), "vault bootstrapped");
        Ok(VaultSession::new(path.to_path_buf(), salt, *params, key, lock))
    }

    /// Read an existing vault file.
    ///
    /// Fails with `NotInitialized` when there is no file, or the file was
    /// never bootstrapped (no salt or no canary).
    pub fn open(path: &Path) -> Result<Self> {
        let file = format::read_vault(path)?;
        if file.salt.is_empty() || !file.secrets.contains_key(CANARY_NAME) {
            return Err(CredVaultError::NotInitialized(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Returns `true` if `path` holds a bootstrapped vault.
    pub fn exists(path: &Path) -> bool {
        Self::open(path).is_ok()
    }

    // ------------------------------------------------------------------
    // Password checks
    // ------------------------------------------------------------------

    /// Check a candidate password against the canary.
    ///
    /// A wrong (or empty) password yields `Ok(false)`; errors are reserved
    /// for a vault that cannot be read.  Nothing on disk changes.
    pub fn validate(&self, password: &Password) -> Result<bool> {
        Ok(self.derive_checked(password)?.is_some())
    }

    /// Validate `password` and start a session holding the derived key.
    ///
    /// A failed check surfaces as `InvalidPassword` so the caller can
    /// re-prompt.
    pub fn unlock(&self, password: &Password) -> Result<VaultSession> {
        self.unlock_with_timeout(password, DEFAULT_LOCK_TIMEOUT)
    }

    /// `unlock` with an explicit write-lock timeout.
    pub fn unlock_with_timeout(
        &self,
        password: &Password,
        lock_timeout: std::time::Duration,
    ) -> Result<VaultSession> {
        let key = self
            .derive_checked(password)?
            .ok_or(CredVaultError::InvalidPassword)?;
        let salt = Salt::from_bytes(&self.file.salt)?;

        debug!(path = %self.path.display(), "vault unlocked");
        Ok(VaultSession::new(
            self.path.clone(),
            salt,
            self.file.kdf,
            key,
            WriteLock::new(&self.path, lock_timeout),
        ))
    }

    /// Derive the key for `password` and return it only if the canary agrees.
    fn derive_checked(&self, password: &Password) -> Result<Option<DerivedKey>> {
        if password.is_empty() {
            return Ok(None);
        }

        let salt = Salt::from_bytes(&self.file.salt)?;
        let canary_blob = &self
            .file
            .secrets
            .get(CANARY_NAME)
            .ok_or_else(|| CredVaultError::NotInitialized(self.path.clone()))?
            .ciphertext;

        let key = derive_key(password, &salt, &self.file.kdf)?;
        if canary::verify(&key, canary_blob)? {
            Ok(Some(key))
        } else {
            debug!(path = %self.path.display(), "password rejected by canary");
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the vault bootstrap timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.file.created_at
    }

    /// KDF parameters recorded at bootstrap.
    pub fn kdf_params(&self) -> &Argon2Params {
        &self.file.kdf
    }

    /// Number of stored credentials (the canary is not counted).
    pub fn secret_count(&self) -> usize {
        self.file
            .secrets
            .keys()
            .filter(|name| !canary::is_reserved(name))
            .count()
    }
}
