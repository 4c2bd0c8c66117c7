//! ui::output
//!
//! Terminal output.
//!
//! # Design
//!
//! Results go to stdout; diagnostics go to stderr with a `[debug]`,
//! `warning:` or `error:` prefix. Everything except errors respects the
//! quiet flag.

use std::fmt::Display;

use crate::engine::command::Outcome;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - also trace each step
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    pub fn is_debug(self) -> bool {
        self == Verbosity::Debug
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print the result of a command: its message, then any listing lines.
pub fn outcome(outcome: &Outcome, verbosity: Verbosity) {
    if !outcome.message.is_empty() {
        print(&outcome.message, verbosity);
    }
    if !outcome.lines.is_empty() {
        print(format_list(&outcome.lines, ""), verbosity);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
