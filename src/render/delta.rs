//! render::delta
//!
//! Ordered visual operations between two projections.
//!
//! # Order
//!
//! 1. New commits, oldest first (a commit is always added after its parents)
//! 2. Commits whose position changed
//! 3. Ref labels added, moved or removed, by name
//! 4. The HEAD marker
//! 5. Commits that disappeared, newest first (children before parents)
//!
//! Diffing a projection against itself yields nothing.

use crate::core::graph::{Head, RefKind};
use crate::core::layout::Point;
use crate::core::types::{CommitId, RefName};

use super::projection::Projection;

/// One visual change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualOp {
    /// Wipe the view before a full redraw.
    Clear,
    /// A new commit circle plus one link per parent.
    AddCommit {
        id: CommitId,
        parents: Vec<(CommitId, Point)>,
        at: Point,
    },
    MoveCommit {
        id: CommitId,
        to: Point,
    },
    AddRef {
        name: RefName,
        kind: RefKind,
        target: CommitId,
        at: Option<Point>,
    },
    MoveRef {
        name: RefName,
        kind: RefKind,
        from: CommitId,
        to: CommitId,
        at: Option<Point>,
    },
    RemoveRef {
        name: RefName,
    },
    MoveHead {
        head: Head,
        target: Option<CommitId>,
        at: Option<Point>,
    },
    RemoveCommit {
        id: CommitId,
    },
}

/// Operations that turn `before` into `after`.
pub fn diff(before: &Projection, after: &Projection) -> Vec<VisualOp> {
    let mut ops = Vec::new();

    let visible = after.commits();

    for commit in visible.iter().filter(|c| before.commit(&c.id).is_none()) {
        let parents = commit
            .parents
            .iter()
            .filter_map(|p| after.commit(p).map(|parent| (p.clone(), parent.point)))
            .collect();
        ops.push(VisualOp::AddCommit {
            id: commit.id.clone(),
            parents,
            at: commit.point,
        });
    }

    for commit in &visible {
        if let Some(old) = before.commit(&commit.id) {
            if old.point != commit.point {
                ops.push(VisualOp::MoveCommit {
                    id: commit.id.clone(),
                    to: commit.point,
                });
            }
        }
    }

    let point_of = |id: &CommitId| after.commit(id).map(|c| c.point);

    let mut names: Vec<&RefName> = before
        .refs()
        .map(|(name, _)| name)
        .chain(after.refs().map(|(name, _)| name))
        .collect();
    names.sort();
    names.dedup();

    for name in names {
        match (before.get_ref(name), after.get_ref(name)) {
            (None, Some(new)) => ops.push(VisualOp::AddRef {
                name: name.clone(),
                kind: new.kind,
                target: new.target.clone(),
                at: point_of(&new.target),
            }),
            (Some(_), None) => ops.push(VisualOp::RemoveRef { name: name.clone() }),
            (Some(old), Some(new)) if old.kind != new.kind => {
                ops.push(VisualOp::RemoveRef { name: name.clone() });
                ops.push(VisualOp::AddRef {
                    name: name.clone(),
                    kind: new.kind,
                    target: new.target.clone(),
                    at: point_of(&new.target),
                });
            }
            (Some(old), Some(new)) if old.target != new.target => ops.push(VisualOp::MoveRef {
                name: name.clone(),
                kind: new.kind,
                from: old.target.clone(),
                to: new.target.clone(),
                at: point_of(&new.target),
            }),
            _ => {}
        }
    }

    if before.head() != after.head() || before.head_target() != after.head_target() {
        if let Some(head) = after.head() {
            ops.push(VisualOp::MoveHead {
                head: head.clone(),
                target: after.head_target().cloned(),
                at: after.head_target().and_then(point_of),
            });
        }
    }

    for commit in before.commits().into_iter().rev() {
        if after.commit(&commit.id).is_none() {
            ops.push(VisualOp::RemoveCommit {
                id: commit.id.clone(),
            });
        }
    }

    ops
}

/// Operations that draw `after` from scratch.
pub fn full(after: &Projection) -> Vec<VisualOp> {
    let mut ops = vec![VisualOp::Clear];
    ops.extend(diff(&Projection::empty(), after));
    ops
}
