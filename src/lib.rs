pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod guard;
pub mod vault;

pub use errors::{CredVaultError, Result};
pub use guard::{Password, Plaintext, SecretValue};
pub use vault::{Vault, VaultSession};
