//! `credvault validate`: check a password against the vault canary.

use crate::cli::output;
use crate::cli::{prompt_password, Cli, CliContext};
use crate::errors::{CredVaultError, Result};
use crate::vault::Vault;

/// Execute the `validate` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;
    let vault = Vault::open(&ctx.vault_path)?;
    let password = prompt_password()?;

    if vault.validate(&password)? {
        output::success(&format!("Password is correct for vault '{}'", ctx.vault_name));
        Ok(())
    } else {
        Err(CredVaultError::InvalidPassword)
    }
}
