//! core
//!
//! Core domain types and the commit-graph model.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CommitId, RefName, UtcTimestamp
//! - [`graph`] - Commit graph: commits, refs, HEAD and traversal
//! - [`revision`] - Revision expressions (`HEAD~2`, `main^2`)
//! - [`reflog`] - Append-only journal of ref movements
//! - [`naming`] - Default-branch relabeling
//! - [`verify`] - Fast verification of graph invariants
//! - [`layout`] - Commit positions for drawing
//! - [`state`] - Graph + reflog + layout for one view
//! - [`snapshot`] - Snapshot token encoding and decoding
//! - [`history`] - Undo/redo history
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Commits are immutable; rewrites create new commits
//! - All verification is deterministic

pub mod config;
pub mod graph;
pub mod history;
pub mod layout;
pub mod naming;
pub mod reflog;
pub mod revision;
pub mod snapshot;
pub mod state;
pub mod types;
pub mod verify;
