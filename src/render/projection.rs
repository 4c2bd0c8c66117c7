//! render::projection
//!
//! The part of a [`GraphState`] that is drawn.
//!
//! Only commits reachable from a ref or HEAD are visible. Unreachable
//! commits stay in the graph (the reflog still names them) but drop out of
//! the picture.

use std::collections::{BTreeMap, HashMap};

use crate::core::graph::{Head, RefKind};
use crate::core::layout::Point;
use crate::core::state::GraphState;
use crate::core::types::{CommitId, RefName};

/// A commit as drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleCommit {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    pub point: Point,
    pub seq: usize,
}

/// A ref label as drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRef {
    pub target: CommitId,
    pub kind: RefKind,
}

/// Drawable view of one state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    commits: HashMap<CommitId, VisibleCommit>,
    refs: BTreeMap<RefName, VisibleRef>,
    head: Option<Head>,
    head_target: Option<CommitId>,
}

impl Projection {
    /// An empty picture.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Project `state`: reachable commits with their positions, every ref,
    /// and HEAD.
    pub fn of(state: &GraphState) -> Self {
        let graph = &state.graph;
        let mut layout = state.layout.clone();
        layout.place_missing(graph);

        let reachable = graph.reachable();
        let commits = graph
            .commits()
            .filter(|c| reachable.contains(&c.id))
            .filter_map(|c| {
                let point = layout.position(&c.id)?;
                Some((
                    c.id.clone(),
                    VisibleCommit {
                        id: c.id.clone(),
                        parents: c.parents.clone(),
                        point,
                        seq: c.seq,
                    },
                ))
            })
            .collect();

        let refs = graph
            .refs()
            .map(|(name, r)| {
                (
                    name.clone(),
                    VisibleRef {
                        target: r.target.clone(),
                        kind: r.kind,
                    },
                )
            })
            .collect();

        Self {
            commits,
            refs,
            head: Some(graph.head().clone()),
            head_target: graph.head_commit().cloned(),
        }
    }

    pub fn commit(&self, id: &CommitId) -> Option<&VisibleCommit> {
        self.commits.get(id)
    }

    /// Visible commits, oldest first.
    pub fn commits(&self) -> Vec<&VisibleCommit> {
        let mut commits: Vec<_> = self.commits.values().collect();
        commits.sort_by_key(|c| c.seq);
        commits
    }

    pub fn refs(&self) -> impl Iterator<Item = (&RefName, &VisibleRef)> {
        self.refs.iter()
    }

    pub fn get_ref(&self, name: &RefName) -> Option<&VisibleRef> {
        self.refs.get(name)
    }

    pub fn head(&self) -> Option<&Head> {
        self.head.as_ref()
    }

    /// The commit the HEAD marker sits on.
    pub fn head_target(&self) -> Option<&CommitId> {
        self.head_target.as_ref()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
