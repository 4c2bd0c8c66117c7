//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity and message printing

pub mod output;
