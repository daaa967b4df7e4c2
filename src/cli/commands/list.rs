//! `credvault list`: display all credentials in a table.

use crate::cli::output;
use crate::cli::{Cli, CliContext};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;
    let session = ctx.unlock()?;

    let secrets = session.list_secrets()?;

    output::info(&format!(
        "vault '{}' — {} credential(s)",
        ctx.vault_name,
        secrets.len()
    ));

    output::print_secrets_table(&secrets);

    Ok(())
}
