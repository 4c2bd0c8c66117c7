//! run command - Execute command lines given as arguments

use anyhow::{bail, Result};

use super::{execute, open};
use crate::cli::Context;

/// Run each line in order. Every line runs even if an earlier one fails;
/// the command fails if any line did.
pub fn run(ctx: &Context, lines: &[String]) -> Result<()> {
    let mut sandbox = open(ctx)?;

    let failed = lines
        .iter()
        .filter(|line| !execute(&mut sandbox, line, ctx))
        .count();

    if failed > 0 {
        bail!("{} of {} commands failed", failed, lines.len());
    }
    Ok(())
}
