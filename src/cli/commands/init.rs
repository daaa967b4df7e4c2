//! `credvault init`: bootstrap a new vault with a password.

use std::fs;

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, CliContext, PASSWORD_ENV};
use crate::errors::{CredVaultError, Result};
use crate::vault::Vault;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;

    // 1. Create the vault directory if it doesn't exist.
    if let Some(dir) = ctx.vault_path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            output::info(&format!("Created vault directory: {}", dir.display()));
        }
    }

    // 2. Refuse to re-bootstrap: a new salt would orphan every stored credential.
    if Vault::exists(&ctx.vault_path) {
        output::tip("Use `credvault set` to add credentials to the existing vault.");
        return Err(CredVaultError::AlreadyInitialized(ctx.vault_path));
    }

    // 3. Prompt for a new password (with confirmation).
    let password = prompt_new_password(PASSWORD_ENV)?;

    // 4. Bootstrap: salt, key, canary.
    let params = ctx.settings.argon2_params();
    let session =
        Vault::bootstrap_with_timeout(&ctx.vault_path, &password, &params, ctx.settings.lock_timeout())?;

    output::success(&format!(
        "Vault '{}' initialized at {}",
        ctx.vault_name,
        session.path().display()
    ));
    output::tip("Run `credvault set <NAME>` to store an exchange credential.");
    output::tip("Run `credvault validate` to check a password.");

    Ok(())
}
