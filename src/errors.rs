use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in credvault.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Caller errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Crypto errors ---
    /// Wrong key, wrong name binding, or corrupted blob. The three causes
    /// are deliberately reported the same way.
    #[error("Integrity check failed: ciphertext could not be authenticated")]
    Integrity,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Vault lifecycle errors ---
    #[error("Vault already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Vault not initialized at {0} — run `credvault init` first")]
    NotInitialized(PathBuf),

    #[error("Wrong vault password")]
    InvalidPassword,

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Vault at {0} was re-keyed after this session was unlocked — unlock it again")]
    StaleSession(PathBuf),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error(
        "Timed out waiting for the vault write lock {} (held by {holder}); \
         if that process is gone, delete the lock file",
        .lock.display()
    )]
    LockTimeout { lock: PathBuf, holder: String },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for credvault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
