//! engine
//!
//! Turns command lines into graph mutations.
//!
//! # Architecture
//!
//! Every command line goes through the same stages:
//!
//! 1. **Tokenize**: split the raw line, honoring quotes
//! 2. **Parse flags**: short/long aliases, unknown tokens become positionals
//! 3. **Type**: build one [`Command`] variant with its own fields
//! 4. **Apply**: run the handler against a copy of the [`Workspace`]
//! 5. **Verify**: check graph invariants before the copy replaces the original
//!
//! ```text
//! "git checkout -b topic main"
//!   -> tokens -> FlagMap { b: "topic", _: ["main"] }
//!   -> Command::Checkout { create: Some(topic), target: Some("main"), .. }
//!   -> Outcome
//! ```
//!
//! # Invariants
//!
//! - A failed command leaves the workspace exactly as it was
//! - Every ref or HEAD move appends one reflog entry, in the order it happens
//! - `switch` is translated to `checkout` before typing and never touches
//!   the graph itself
//!
//! # Example
//!
//! ```
//! use gitsketch::core::layout::Dimensions;
//! use gitsketch::core::state::GraphState;
//! use gitsketch::core::types::RefName;
//! use gitsketch::engine::{Interpreter, Workspace};
//!
//! let local = GraphState::new("demo", RefName::new("main").unwrap(), Dimensions::default(), None);
//! let mut interpreter = Interpreter::new(Workspace::new(local, None));
//!
//! let output = interpreter.run_line("git commit -m 'first'");
//! assert!(output.is_success());
//! assert_eq!(interpreter.workspace().local.graph.len(), 1);
//! ```

pub mod command;
pub mod flags;
pub mod interpreter;
pub mod remote;

pub use command::{Command, CommandError, CommandOutput, Outcome, ResetMode};
pub use flags::{parse_flags, tokenize, translate_switch, FlagError, FlagMap, FlagValue};
pub use interpreter::{Interpreter, Workspace};
