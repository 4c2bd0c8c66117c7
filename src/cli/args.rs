//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--config <path>`: Use this config file
//! - `--state-file <path>`: Save undo history in this file
//! - `--default-branch <name>`: Name of the initial branch
//! - `--no-origin`: Open without a simulated origin
//! - `--trace-render`: Print renderer calls instead of the text graph

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitsketch - watch a commit graph respond to git commands
#[derive(Parser, Debug)]
#[command(name = "gitsketch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save the undo history in this file
    #[arg(long, global = true, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Name of the initial branch
    #[arg(long, global = true, value_name = "NAME")]
    pub default_branch: Option<String>,

    /// Open without a simulated origin
    #[arg(long, global = true)]
    pub no_origin: bool,

    /// Print renderer calls instead of the text graph
    #[arg(long, global = true)]
    pub trace_render: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read command lines from stdin
    #[command(
        name = "repl",
        long_about = "Read command lines from stdin until end of input or `exit`.\n\n\
            Each line is one git command (the leading `git` is optional). After \
            every command the outcome and the graph are printed. `undo` and \
            `redo` step through the history.",
        after_help = "\
EXAMPLES:
    gitsketch repl
    printf 'commit -m one\\ncheckout -b topic\\n' | gitsketch repl"
    )]
    Repl,

    /// Run the given command lines in order
    #[command(
        name = "run",
        after_help = "\
EXAMPLES:
    gitsketch run 'commit -m second' 'checkout -b topic'
    gitsketch --state-file demo.json run 'merge topic'"
    )]
    Run {
        /// Command lines, one per argument
        #[arg(required = true, value_name = "LINE")]
        lines: Vec<String>,
    },

    /// Print the current graph
    Show,

    /// Delete the saved undo history
    Reset,

    /// Print the snapshot token of the current graph
    Export,
}
