//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler:
//! 1. Opens the sandbox with configuration and flag overrides applied
//! 2. Feeds it command lines
//! 3. Formats and displays output
//!
//! Handlers never mutate a graph directly; everything flows through the
//! sandbox coordinator.

mod export;
mod repl;
mod reset;
mod run;
mod show;

pub use export::export;
pub use repl::repl;
pub use reset::reset;
pub use run::run;
pub use show::show;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::config::Config;
use crate::engine::command::CommandOutput;
use crate::render::{draw_text, RecordingRenderer};
use crate::sandbox::Coordinator;
use crate::storage::create_store;
use crate::ui::output;

/// Name of the sandbox the CLI opens.
pub const SANDBOX_NAME: &str = "Sandbox";

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Repl => repl::repl(ctx),
        Command::Run { lines } => run::run(ctx, &lines),
        Command::Show => show::show(ctx),
        Command::Reset => reset::reset(ctx),
        Command::Export => export::export(ctx),
    }
}

/// Load configuration and apply flag overrides.
fn load_config(ctx: &Context) -> Result<Config> {
    let loaded = Config::load(ctx.config.as_deref()).context("Failed to load config")?;
    for warning in &loaded.warnings {
        output::warn(&warning.message, ctx.verbosity);
    }
    if let Some(path) = loaded.config.loaded_from() {
        output::debug(format!("config: {}", path.display()), ctx.verbosity);
    }

    let config = loaded
        .config
        .with_default_branch(ctx.default_branch.clone())
        .context("Invalid --default-branch")?
        .with_state_file(ctx.state_file.clone())
        .without_origin(ctx.no_origin);
    Ok(config)
}

/// A coordinator over the configured store, not yet opened.
fn coordinator(ctx: &Context) -> Result<Coordinator<RecordingRenderer>> {
    let config = load_config(ctx)?;
    let store = create_store(config.state_file());
    Coordinator::new(config, store, RecordingRenderer::new(), ctx.verbosity)
        .context("Failed to create sandbox")
}

/// Open the CLI sandbox and print its initial state.
fn open(ctx: &Context) -> Result<Coordinator<RecordingRenderer>> {
    let mut sandbox = coordinator(ctx)?;
    sandbox
        .open(SANDBOX_NAME)
        .context("Failed to open sandbox")?;
    Ok(sandbox)
}

/// Run one line and print its outcome. Returns whether it succeeded.
fn execute(sandbox: &mut Coordinator<RecordingRenderer>, line: &str, ctx: &Context) -> bool {
    let succeeded = match sandbox.run_line(line) {
        CommandOutput::Success(outcome) => {
            output::outcome(&outcome, ctx.verbosity);
            true
        }
        CommandOutput::Failed { error } => {
            output::error(error);
            false
        }
    };
    print_state(sandbox, ctx);
    succeeded
}

/// Print the graph: either the drawn text or the renderer calls that were
/// queued since the last print.
fn print_state(sandbox: &mut Coordinator<RecordingRenderer>, ctx: &Context) {
    sandbox.flush_render();
    let calls = sandbox.renderer().take();

    if ctx.trace_render {
        output::print(output::format_list(&calls, ""), ctx.verbosity);
        return;
    }

    let Some(workspace) = sandbox.workspace() else {
        return;
    };
    output::print(draw_text(&workspace.local).trim_end(), ctx.verbosity);
    if let Some(origin) = workspace.origin.as_ref() {
        output::print(draw_text(origin).trim_end(), ctx.verbosity);
    }
}
