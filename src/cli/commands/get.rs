//! `credvault get`: decrypt and print a single credential.

use crate::cli::{Cli, CliContext};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let ctx = CliContext::resolve(cli)?;
    let session = ctx.unlock()?;

    let value = session.load_secret(name)?;
    println!("{}", value.reveal());

    Ok(())
}
