//! `credvault delete`: remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{Cli, CliContext};
use crate::errors::{CredVaultError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete credential '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let session = ctx.unlock()?;
    session.remove_secret(name)?;

    output::success(&format!("Deleted credential '{name}'"));

    Ok(())
}
