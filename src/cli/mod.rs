//! cli
//!
//! Command-line interface for gitsketch.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and apply flag overrides
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands command
//! lines to a [`crate::sandbox::Coordinator`]. It never touches a graph
//! itself.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Settings from global flags, shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub default_branch: Option<String>,
    pub no_origin: bool,
    pub trace_render: bool,
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        config: cli.config.clone(),
        state_file: cli.state_file.clone(),
        default_branch: cli.default_branch.clone(),
        no_origin: cli.no_origin,
        trace_render: cli.trace_render,
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, &ctx)
}
