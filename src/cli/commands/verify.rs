//! `credvault verify`: decrypt every credential and report failures.
//!
//! Replaces one-off debug scripts: a credential that fails here will also
//! fail when a connector loads it at startup.

use crate::cli::output;
use crate::cli::{Cli, CliContext};
use crate::errors::{CredVaultError, Result};

/// Execute the `verify` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;
    let session = ctx.unlock()?;

    let report = session.verify_all()?;
    if report.ok.is_empty() && report.failed.is_empty() {
        output::info("No credentials in this vault yet.");
        return Ok(());
    }

    output::print_verify_table(&report);

    if report.is_clean() {
        output::success(&format!("All {} credential(s) decrypt cleanly", report.ok.len()));
        Ok(())
    } else {
        output::tip("Re-enter failing credentials with `credvault set <NAME>`.");
        Err(CredVaultError::CommandFailed(format!(
            "{} credential(s) failed the integrity check",
            report.failed.len()
        )))
    }
}
