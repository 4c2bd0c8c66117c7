//! reset command - Delete the saved undo history

use anyhow::{Context as _, Result};

use super::coordinator;
use crate::cli::Context;
use crate::ui::output;

pub fn reset(ctx: &Context) -> Result<()> {
    let sandbox = coordinator(ctx)?;
    sandbox
        .clear_saved_state()
        .context("Failed to clear saved state")?;
    output::print("Cleared saved state.", ctx.verbosity);
    Ok(())
}
