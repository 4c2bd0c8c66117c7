//! core::state
//!
//! The full state of one visualization: graph, reflog, layout and view
//! metadata. This is the unit that commands mutate, snapshots save and undo
//! restores.

use super::graph::{CommitGraph, GraphError};
use super::layout::{Dimensions, Layout};
use super::naming::Relabel;
use super::reflog::Reflog;
use super::types::RefName;

/// Identity of the view a state belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMeta {
    /// View name, also used as the id-allocation seed.
    pub name: String,
    /// Name of the remote whose tracking refs live in this graph.
    pub remote_name: Option<String>,
}

/// Graph, reflog and layout for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphState {
    pub graph: CommitGraph,
    pub reflog: Reflog,
    pub layout: Layout,
    pub meta: ViewMeta,
}

impl GraphState {
    /// An empty state whose HEAD is attached to the unborn default branch.
    pub fn new(
        name: impl Into<String>,
        default_branch: RefName,
        dimensions: Dimensions,
        remote_name: Option<String>,
    ) -> Self {
        let name = name.into();
        Self {
            graph: CommitGraph::new(name.clone(), default_branch),
            reflog: Reflog::new(),
            layout: Layout::new(dimensions),
            meta: ViewMeta { name, remote_name },
        }
    }

    /// Rename the default branch everywhere: the branch itself, its
    /// remote-tracking ref, HEAD and every reflog name and reason.
    ///
    /// Renaming to the current name is a no-op, so applying the same rename
    /// twice leaves the state unchanged after the first pass.
    ///
    /// # Errors
    ///
    /// Fails with `GraphError::RefAlreadyExists` if a renamed ref would
    /// collide with one that already exists. The state is unchanged then.
    pub fn rename_default_branch(&mut self, to: &RefName) -> Result<(), GraphError> {
        let from = self.graph.default_branch().clone();
        self.relabel_branch(&from, to)
    }

    /// Rename `from` to `to` in refs, HEAD and the reflog.
    pub fn relabel_branch(&mut self, from: &RefName, to: &RefName) -> Result<(), GraphError> {
        let remote = self.meta.remote_name.clone();
        let mut relabel = Relabel::new(from.as_str(), to.as_str());
        if let Some(remote) = remote.as_deref() {
            relabel = relabel.with_remote(remote);
        }
        if relabel.is_noop() {
            return Ok(());
        }

        let mut renames = Vec::new();
        for (name, _) in self.graph.refs() {
            if let Some(renamed) = relabel.label(name.as_str()) {
                renames.push((name.clone(), RefName::new(renamed)?));
            }
        }

        let mut graph = self.graph.clone();
        let from_exists = graph.get_ref(from).is_some();
        for (old, new) in &renames {
            graph.rename_ref(old, new)?;
        }
        if !from_exists {
            // Unborn branch: only HEAD and the default-branch setting follow.
            graph.rename_ref(from, to)?;
        }

        self.graph = graph;
        self.reflog.relabel(&relabel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::{Head, RefKind};

    fn name(s: &str) -> RefName {
        RefName::new(s).unwrap()
    }

    fn legacy_state() -> GraphState {
        let mut state = GraphState::new(
            "view",
            name("master"),
            Dimensions::default(),
            Some("origin".into()),
        );
        let root = state.graph.create_commit(vec![], None).unwrap();
        state.graph.advance_head(root.clone()).unwrap();
        state
            .graph
            .create_ref(name("origin/master"), RefKind::Remote, root.clone())
            .unwrap();
        state
            .reflog
            .append("master", None, root.clone(), "commit (initial): root");
        state
            .reflog
            .append("HEAD", None, root, "checkout: moving from master to master");
        state
    }

    #[test]
    fn rename_moves_everything() {
        let mut state = legacy_state();
        state.rename_default_branch(&name("main")).unwrap();

        assert_eq!(state.graph.head(), &Head::Attached(name("main")));
        assert_eq!(state.graph.default_branch(), &name("main"));
        assert!(state.graph.get_ref(&name("origin/main")).is_some());
        assert!(state.graph.get_ref(&name("master")).is_none());
        assert_eq!(state.reflog.entries_for("main").len(), 1);
        assert_eq!(
            state.reflog.entries_for("HEAD")[0].reason,
            "checkout: moving from main to main"
        );
    }

    #[test]
    fn rename_is_idempotent() {
        let mut state = legacy_state();
        state.rename_default_branch(&name("main")).unwrap();
        let once = state.clone();
        state.rename_default_branch(&name("main")).unwrap();
        assert_eq!(state, once);
    }

    #[test]
    fn collision_leaves_state_unchanged() {
        let mut state = legacy_state();
        let root = state.graph.head_commit().cloned().unwrap();
        state
            .graph
            .create_ref(name("main"), RefKind::Branch, root)
            .unwrap();
        let before = state.clone();
        assert!(state.rename_default_branch(&name("main")).is_err());
        assert_eq!(state, before);
    }
}
