//! gitsketch - watch a commit graph respond to git commands
//!
//! gitsketch is a teaching sandbox. You type short git-style commands and
//! an in-memory commit graph, its branches, tags and HEAD respond exactly
//! the way git would move them. Nothing touches a real repository.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the sandbox)
//! - [`sandbox`] - Open/reset lifecycle, undo/redo, persistence, render wiring
//! - [`engine`] - Tokenizes, types and applies commands transactionally
//! - [`core`] - Commit graph, reflog, layout, snapshots, history, config
//! - [`render`] - Visual deltas, draw queue and the renderer boundary
//! - [`storage`] - Key-value persistence of the undo history
//! - [`ui`] - Output and verbosity
//!
//! # Correctness Invariants
//!
//! 1. Every parent of a commit exists and the graph is acyclic
//! 2. HEAD resolves to exactly one commit, or the graph is empty
//! 3. A failed command leaves the graph, reflog and layout unchanged
//! 4. Every ref or HEAD move is journaled in the reflog
//! 5. Snapshots restore a state that is observationally equal to the original

pub mod cli;
pub mod core;
pub mod engine;
pub mod render;
pub mod sandbox;
pub mod storage;
pub mod ui;
