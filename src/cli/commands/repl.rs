//! repl command - Read command lines from stdin

use std::io::{self, BufRead};

use anyhow::{Context as _, Result};

use super::{execute, open, print_state};
use crate::cli::Context;
use crate::ui::output;

/// Read lines until end of input or `exit`/`quit`. Failed commands are
/// reported and the loop goes on.
pub fn repl(ctx: &Context) -> Result<()> {
    let mut sandbox = open(ctx)?;
    print_state(&mut sandbox, ctx);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            _ => {
                execute(&mut sandbox, line, ctx);
            }
        }
    }

    output::debug("end of input", ctx.verbosity);
    Ok(())
}
