//! export command - Print the snapshot token of the current graph

use anyhow::{Context as _, Result};

use super::open;
use crate::cli::Context;

/// The token is printed even with `--quiet`; it is the command's result.
pub fn export(ctx: &Context) -> Result<()> {
    let sandbox = open(ctx)?;
    let token = sandbox.export().context("Failed to export snapshot")?;
    println!("{}", token);
    Ok(())
}
