//! `credvault rotate-key`: change the vault password.
//!
//! Re-encrypts the canary and every credential under a new salt and key,
//! then writes the vault atomically.

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, CliContext, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `rotate-key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;

    // 1. Unlock with the current password.
    output::info("Enter your current vault password.");
    let session = ctx.unlock()?;

    // 2. Prompt for the new password.
    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Re-key using the currently configured work factor.
    let params = ctx.settings.argon2_params();
    let session = session.rotate_password(&new_password, &params)?;
    let count = session.list_secrets()?.len();

    output::success(&format!(
        "Password rotated for vault '{}' ({count} credential(s) re-encrypted)",
        ctx.vault_name
    ));

    Ok(())
}
