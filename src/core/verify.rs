//! core::verify
//!
//! Fast verification of commit-graph invariants.
//!
//! # Checks
//!
//! - Every parent exists and was inserted before its child (so the graph
//!   is acyclic)
//! - Every ref points at an existing commit
//! - HEAD resolves: a detached HEAD names an existing commit, an attached
//!   HEAD names a local branch (an unborn branch only on an empty graph)
//!
//! # Invariants
//!
//! - Never mutates the graph
//! - Must be deterministic

use thiserror::Error;

use super::graph::{CommitGraph, Head, RefKind};

/// Errors from verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("commit {commit} has missing parent {parent}")]
    DanglingParent { commit: String, parent: String },

    #[error("commit {commit} was inserted before its parent {parent}")]
    OutOfOrder { commit: String, parent: String },

    #[error("ref {name} points at missing commit {target}")]
    DanglingRef { name: String, target: String },

    #[error("HEAD points at missing commit {0}")]
    DanglingHead(String),

    #[error("HEAD is attached to {0}, which is not a local branch")]
    HeadNotOnBranch(String),
}

/// Result of fast verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    /// Convert into a `Result`, keeping the first error.
    pub fn into_result(self) -> Result<(), VerifyError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}

/// Verify the structural invariants of a commit graph.
pub fn fast_verify(graph: &CommitGraph) -> VerifyResult {
    let mut errors = Vec::new();

    for commit in graph.commits() {
        for parent in &commit.parents {
            match graph.commit(parent) {
                None => errors.push(VerifyError::DanglingParent {
                    commit: commit.id.to_string(),
                    parent: parent.to_string(),
                }),
                Some(p) if p.seq >= commit.seq => errors.push(VerifyError::OutOfOrder {
                    commit: commit.id.to_string(),
                    parent: parent.to_string(),
                }),
                Some(_) => {}
            }
        }
    }

    for (name, r) in graph.refs() {
        if !graph.contains(&r.target) {
            errors.push(VerifyError::DanglingRef {
                name: name.to_string(),
                target: r.target.to_string(),
            });
        }
    }

    match graph.head() {
        Head::Detached(id) if !graph.contains(id) => {
            errors.push(VerifyError::DanglingHead(id.to_string()));
        }
        Head::Attached(name) => match graph.get_ref(name) {
            Some(r) if r.kind != RefKind::Branch => {
                errors.push(VerifyError::HeadNotOnBranch(name.to_string()));
            }
            None if !graph.is_empty() => {
                errors.push(VerifyError::HeadNotOnBranch(name.to_string()));
            }
            _ => {}
        },
        Head::Detached(_) => {}
    }

    if errors.is_empty() {
        VerifyResult::success()
    } else {
        VerifyResult::failure(errors)
    }
}
