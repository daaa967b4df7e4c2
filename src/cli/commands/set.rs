//! `credvault set`: add or update a credential.
//!
//! This is the configuration-time write boundary: the value is wrapped in
//! `Plaintext::from_input`, which trims copy-paste whitespace once.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{Cli, CliContext};
use crate::errors::{CredVaultError, Result};
use crate::guard::Plaintext;
use crate::vault::validate_secret_name;

/// Execute the `set` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    // Fail on a bad name before asking for anything.
    validate_secret_name(name)?;
    let ctx = CliContext::resolve(cli)?;

    // Unlock first so a wrong password doesn't waste a pasted credential.
    let session = ctx.unlock()?;

    // Determine the value from one of three sources.
    let raw = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {name}"))
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?
    };

    let plaintext = Plaintext::from_input(raw);
    if plaintext.is_empty() {
        return Err(CredVaultError::CommandFailed(format!(
            "refusing to store an empty value for '{name}'"
        )));
    }

    let replaced = session.store_secret(name, &plaintext)?;
    let verb = if replaced { "updated in" } else { "added to" };
    output::success(&format!(
        "Credential '{name}' {verb} vault '{}'",
        ctx.vault_name
    ));

    Ok(())
}
