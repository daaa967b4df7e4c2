//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::{CredVaultError, Result};
use crate::guard::Password;
use crate::vault::{Vault, VaultSession};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable checked before prompting for the vault password.
pub const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// Environment variable checked for the replacement password in `rotate-key`.
pub const NEW_PASSWORD_ENV: &str = "CREDVAULT_NEW_PASSWORD";

/// credvault CLI: encrypted credential vault for exchange connectors.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Encrypted credential vault for exchange connectors",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault to use (default: from .credvault.toml, else "default")
    #[arg(long, global = true)]
    pub vault: Option<String>,

    /// Vault directory (default: from .credvault.toml, else .credvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault with a password
    Init,

    /// Store a credential (add or update)
    Set {
        /// Credential name (e.g. extended_perpetual_api_key)
        name: String,
        /// Credential value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Decrypt and print a credential
    Get {
        /// Credential name
        name: String,
    },

    /// List stored credentials
    List,

    /// Delete a credential
    Delete {
        /// Credential name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Check whether a password opens the vault
    Validate,

    /// Decrypt every credential and report integrity failures
    Verify,

    /// Change the vault password (re-encrypts everything)
    RotateKey,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved per-invocation context: settings plus the vault file path.
pub struct CliContext {
    pub settings: Settings,
    pub vault_name: String,
    pub vault_path: PathBuf,
}

impl CliContext {
    /// Resolve settings from the current directory, then apply CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut settings = Settings::load(&cwd)?;
        if let Some(dir) = &cli.vault_dir {
            settings.vault_dir = dir.clone();
        }

        let vault_name = cli
            .vault
            .clone()
            .unwrap_or_else(|| settings.default_vault.clone());
        validate_vault_name(&vault_name)?;

        let vault_path = settings.vault_path(&cwd, &vault_name);
        Ok(Self {
            settings,
            vault_name,
            vault_path,
        })
    }

    /// Open the vault, ask for the password, and start a session.
    pub fn unlock(&self) -> Result<VaultSession> {
        let vault = Vault::open(&self.vault_path)?;
        let password = prompt_password()?;
        vault.unlock_with_timeout(&password, self.settings.lock_timeout())
    }
}

/// Get the vault password, trying in order:
/// 1. `CREDVAULT_PASSWORD` env var (CI / headless bots)
/// 2. Interactive prompt without echo
pub fn prompt_password() -> Result<Password> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Password::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Password::new(pw))
}

/// Prompt for a new password with confirmation (used by `init` and `rotate-key`).
///
/// Also respects `env_var` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password(env_var: &str) -> Result<Password> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            let pw = Password::new(pw);
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(CredVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(pw);
        }
    }

    loop {
        let password = Password::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault password")
                .with_confirmation(
                    "Confirm vault password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Validate that a vault name is safe to use as a file name.
///
/// Allowed: lowercase letters, digits, hyphens, underscores. Must not be
/// empty or start/end with a hyphen. Max length 64 characters.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CredVaultError::ConfigError(
            "vault name cannot be empty".into(),
        ));
    }

    if name.len() > 64 {
        return Err(CredVaultError::ConfigError(
            "vault name cannot exceed 64 characters".into(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(CredVaultError::ConfigError(format!(
            "vault name '{name}' is invalid — only lowercase letters, digits, hyphens, and underscores are allowed"
        )));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(CredVaultError::ConfigError(format!(
            "vault name '{name}' cannot start or end with a hyphen"
        )));
    }

    Ok(())
}
