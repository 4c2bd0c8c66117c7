//! show command - Print the current graph

use anyhow::Result;

use super::{open, print_state};
use crate::cli::Context;

pub fn show(ctx: &Context) -> Result<()> {
    let mut sandbox = open(ctx)?;
    print_state(&mut sandbox, ctx);
    Ok(())
}
