//! core::graph
//!
//! The commit graph: commits, parent edges, refs and HEAD.
//!
//! # Architecture
//!
//! The graph is a DAG where:
//! - Nodes are immutable commits, stored once and never removed
//! - Edges point from child to parent (ordered; first parent first)
//! - Refs (branches, tags, remote-tracking branches) bind names to commits
//! - HEAD is attached to a branch name or detached at a commit
//!
//! # Invariants
//!
//! - Every parent referenced by a commit exists (parents are inserted first)
//! - The graph is acyclic (follows from the above)
//! - Every ref resolves to an existing commit
//! - HEAD resolves to exactly one commit, or the graph is empty
//!
//! Rewrites (amend, rebase, revert) create new commits. Commits that become
//! unreachable stay in the graph so the reflog can still name them.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::revision::{Revision, Step};
use super::types::{CommitId, RefName, TypeError};

/// Minimum length of an id prefix accepted by [`CommitGraph::resolve`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Errors from graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown reference: '{0}'")]
    UnknownReference(String),

    #[error("ambiguous reference '{reference}': matches {}", format_candidates(.candidates))]
    AmbiguousReference {
        reference: String,
        candidates: Vec<CommitId>,
    },

    #[error("no common ancestor between {0} and {1}")]
    NoCommonAncestor(CommitId, CommitId),

    #[error("parent commit does not exist: {0}")]
    UnknownParent(CommitId),

    #[error("commit already exists: {0}")]
    DuplicateCommit(CommitId),

    #[error("a ref named '{0}' already exists")]
    RefAlreadyExists(RefName),

    #[error(transparent)]
    Invalid(#[from] TypeError),
}

fn format_candidates(candidates: &[CommitId]) -> String {
    candidates
        .iter()
        .map(CommitId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a commit came to exist when it is a copy of another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum CommitOrigin {
    /// Replaces the source commit (`commit --amend`).
    Amend(CommitId),
    /// Replayed from the source commit by `rebase`.
    Rebase(CommitId),
    /// Copied from the source commit by `cherry-pick`.
    CherryPick(CommitId),
    /// Undoes the source commit (`revert`).
    Revert(CommitId),
}

impl CommitOrigin {
    /// The commit this one was derived from.
    pub fn source(&self) -> &CommitId {
        match self {
            CommitOrigin::Amend(id)
            | CommitOrigin::Rebase(id)
            | CommitOrigin::CherryPick(id)
            | CommitOrigin::Revert(id) => id,
        }
    }
}

/// An immutable commit node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    /// Parents in order; empty for a root, two or more for a merge.
    pub parents: Vec<CommitId>,
    pub message: Option<String>,
    pub origin: Option<CommitOrigin>,
    /// Insertion order. Parents always have a smaller sequence number.
    pub seq: usize,
}

impl Commit {
    /// First parent, if any.
    pub fn parent(&self) -> Option<&CommitId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The change this commit carries, identified by the commit that first
    /// introduced it. Replayed copies share the patch id of their source.
    pub fn patch_id<'a>(&'a self, graph: &'a CommitGraph) -> &'a CommitId {
        let mut current = self;
        while let Some(CommitOrigin::Rebase(src) | CommitOrigin::CherryPick(src)) = &current.origin
        {
            match graph.commit(src) {
                Some(source) => current = source,
                None => return src,
            }
        }
        &current.id
    }
}

/// The kind of a ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// Local branch; moves as commits are made on it.
    Branch,
    /// Tag; created once and never moved.
    Tag,
    /// Remote-tracking branch (`origin/main`); moved only by fetch/push.
    Remote,
}

/// A named pointer to a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub target: CommitId,
    pub kind: RefKind,
}

/// Where HEAD points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Following a branch. The branch may not exist yet on an empty graph.
    Attached(RefName),
    /// Pointing straight at a commit.
    Detached(CommitId),
}

impl Head {
    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }

    /// Human-readable position, as used in reflog reasons.
    pub fn describe(&self) -> String {
        match self {
            Head::Attached(name) => name.to_string(),
            Head::Detached(id) => id.to_string(),
        }
    }
}

/// The commit graph for one visualization instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitGraph {
    /// Seed mixed into allocated ids so that two graphs never collide.
    seed: String,
    commits: HashMap<CommitId, Commit>,
    /// Commit ids in insertion order.
    order: Vec<CommitId>,
    refs: BTreeMap<RefName, Ref>,
    head: Head,
    default_branch: RefName,
    /// Counter consumed by id allocation.
    generation: u64,
}

impl CommitGraph {
    /// Create an empty graph with HEAD attached to the (unborn) default branch.
    pub fn new(seed: impl Into<String>, default_branch: RefName) -> Self {
        Self {
            seed: seed.into(),
            commits: HashMap::new(),
            order: Vec::new(),
            refs: BTreeMap::new(),
            head: Head::Attached(default_branch.clone()),
            default_branch,
            generation: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn default_branch(&self) -> &RefName {
        &self.default_branch
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn commit(&self, id: &CommitId) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.commits.contains_key(id)
    }

    /// All commits in insertion order (a topological order).
    pub fn commits(&self) -> impl Iterator<Item = &Commit> {
        self.order.iter().filter_map(|id| self.commits.get(id))
    }

    /// Allocate a fresh commit id.
    ///
    /// Ids are derived from the seed and the generation counter, so the same
    /// sequence of operations always produces the same ids.
    fn allocate_id(&mut self) -> CommitId {
        loop {
            let mut hasher = Sha256::new();
            hasher.update(self.seed.as_bytes());
            hasher.update(b":");
            hasher.update(self.generation.to_be_bytes());
            self.generation += 1;

            let digest = hasher.finalize();
            let mut encoded = hex::encode(&digest[..4]);
            encoded.truncate(7);
            let candidate = CommitId::from_allocated(encoded);
            if !self.commits.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Create a commit with a freshly allocated id. No ref moves.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownParent` if any parent is missing.
    pub fn create_commit(
        &mut self,
        parents: Vec<CommitId>,
        message: Option<String>,
    ) -> Result<CommitId, GraphError> {
        self.create_derived_commit(parents, message, None)
    }

    /// Create a commit that records where it was copied from.
    pub fn create_derived_commit(
        &mut self,
        parents: Vec<CommitId>,
        message: Option<String>,
        origin: Option<CommitOrigin>,
    ) -> Result<CommitId, GraphError> {
        self.check_parents(&parents)?;
        let id = self.allocate_id();
        self.push_commit(id.clone(), parents, message, origin);
        Ok(id)
    }

    /// Insert a commit with a supplied id (scenario data, restored snapshots,
    /// objects copied between graphs).
    ///
    /// # Errors
    ///
    /// Fails if the id is taken or a parent is missing.
    pub fn insert_commit(
        &mut self,
        id: CommitId,
        parents: Vec<CommitId>,
        message: Option<String>,
        origin: Option<CommitOrigin>,
    ) -> Result<(), GraphError> {
        if self.commits.contains_key(&id) {
            return Err(GraphError::DuplicateCommit(id));
        }
        self.check_parents(&parents)?;
        self.push_commit(id, parents, message, origin);
        Ok(())
    }

    fn check_parents(&self, parents: &[CommitId]) -> Result<(), GraphError> {
        match parents.iter().find(|p| !self.commits.contains_key(*p)) {
            Some(missing) => Err(GraphError::UnknownParent(missing.clone())),
            None => Ok(()),
        }
    }

    fn push_commit(
        &mut self,
        id: CommitId,
        parents: Vec<CommitId>,
        message: Option<String>,
        origin: Option<CommitOrigin>,
    ) {
        let commit = Commit {
            id: id.clone(),
            parents,
            message,
            origin,
            seq: self.order.len(),
        };
        self.order.push(id.clone());
        self.commits.insert(id, commit);
    }

    // ---------------------------------------------------------------------
    // Refs
    // ---------------------------------------------------------------------

    pub fn get_ref(&self, name: &RefName) -> Option<&Ref> {
        self.refs.get(name)
    }

    pub fn refs(&self) -> impl Iterator<Item = (&RefName, &Ref)> {
        self.refs.iter()
    }

    pub fn refs_of_kind(&self, kind: RefKind) -> impl Iterator<Item = (&RefName, &CommitId)> {
        self.refs
            .iter()
            .filter(move |(_, r)| r.kind == kind)
            .map(|(name, r)| (name, &r.target))
    }

    pub fn branch_tip(&self, name: &RefName) -> Option<&CommitId> {
        self.refs
            .get(name)
            .filter(|r| r.kind == RefKind::Branch)
            .map(|r| &r.target)
    }

    /// Names of all refs pointing at `id`, sorted.
    pub fn labels_for(&self, id: &CommitId) -> Vec<&RefName> {
        self.refs
            .iter()
            .filter(|(_, r)| &r.target == id)
            .map(|(name, _)| name)
            .collect()
    }

    /// Create a ref that must not exist yet.
    pub fn create_ref(
        &mut self,
        name: RefName,
        kind: RefKind,
        target: CommitId,
    ) -> Result<(), GraphError> {
        if self.refs.contains_key(&name) {
            return Err(GraphError::RefAlreadyExists(name));
        }
        self.ensure_commit(&target)?;
        self.refs.insert(name, Ref { target, kind });
        Ok(())
    }

    /// Point `name` at `target`, creating a branch if it does not exist.
    ///
    /// Returns the previous target. The caller records the reflog entry.
    pub fn move_ref(
        &mut self,
        name: &RefName,
        target: CommitId,
    ) -> Result<Option<CommitId>, GraphError> {
        self.ensure_commit(&target)?;
        match self.refs.get_mut(name) {
            Some(existing) => Ok(Some(std::mem::replace(&mut existing.target, target))),
            None => {
                self.refs.insert(
                    name.clone(),
                    Ref {
                        target,
                        kind: RefKind::Branch,
                    },
                );
                Ok(None)
            }
        }
    }

    /// Remove a ref, returning it.
    pub fn delete_ref(&mut self, name: &RefName) -> Result<Ref, GraphError> {
        self.refs
            .remove(name)
            .ok_or_else(|| GraphError::UnknownReference(name.to_string()))
    }

    /// Rename a ref in place, following HEAD and the default-branch setting.
    ///
    /// Renaming onto an existing name fails; renaming a missing ref only
    /// updates HEAD and the default branch (an unborn branch).
    pub fn rename_ref(&mut self, from: &RefName, to: &RefName) -> Result<(), GraphError> {
        if from == to {
            return Ok(());
        }
        if self.refs.contains_key(to) {
            return Err(GraphError::RefAlreadyExists(to.clone()));
        }
        if let Some(r) = self.refs.remove(from) {
            self.refs.insert(to.clone(), r);
        }
        if self.head == Head::Attached(from.clone()) {
            self.head = Head::Attached(to.clone());
        }
        if &self.default_branch == from {
            self.default_branch = to.clone();
        }
        Ok(())
    }

    fn ensure_commit(&self, id: &CommitId) -> Result<(), GraphError> {
        if self.commits.contains_key(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownReference(id.to_string()))
        }
    }

    // ---------------------------------------------------------------------
    // HEAD
    // ---------------------------------------------------------------------

    pub fn head(&self) -> &Head {
        &self.head
    }

    /// The branch HEAD is attached to, if any.
    pub fn current_branch(&self) -> Option<&RefName> {
        match &self.head {
            Head::Attached(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    /// The commit HEAD resolves to. `None` only while the branch is unborn.
    pub fn head_commit(&self) -> Option<&CommitId> {
        match &self.head {
            Head::Attached(name) => self.refs.get(name).map(|r| &r.target),
            Head::Detached(id) => Some(id),
        }
    }

    /// Attach HEAD to a branch name.
    pub fn attach_head(&mut self, branch: RefName) {
        self.head = Head::Attached(branch);
    }

    /// Detach HEAD at a commit.
    pub fn detach_head(&mut self, id: CommitId) -> Result<(), GraphError> {
        self.ensure_commit(&id)?;
        self.head = Head::Detached(id);
        Ok(())
    }

    /// Move HEAD: attach if `target` names a local branch, otherwise resolve
    /// it and detach. Returns the previous HEAD.
    pub fn checkout(&mut self, target: &str) -> Result<Head, GraphError> {
        let branch = RefName::new(target)
            .ok()
            .filter(|name| self.branch_tip(name).is_some());

        let next = match branch {
            Some(name) => Head::Attached(name),
            None => Head::Detached(self.resolve(target)?),
        };
        Ok(std::mem::replace(&mut self.head, next))
    }

    /// Move whatever HEAD follows to `target`: the attached branch (created if
    /// unborn) or HEAD itself when detached.
    ///
    /// Returns the name that moved (`None` for detached HEAD) and its previous
    /// commit.
    pub fn advance_head(
        &mut self,
        target: CommitId,
    ) -> Result<(Option<RefName>, Option<CommitId>), GraphError> {
        match self.head.clone() {
            Head::Attached(name) => {
                let previous = self.move_ref(&name, target)?;
                Ok((Some(name), previous))
            }
            Head::Detached(previous) => {
                self.detach_head(target)?;
                Ok((None, Some(previous)))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Resolution and traversal
    // ---------------------------------------------------------------------

    /// Resolve a revision: `HEAD`, a ref name, a commit id or unique id
    /// prefix, optionally followed by `~N` / `^N` steps.
    ///
    /// # Example
    ///
    /// ```
    /// use gitsketch::core::graph::CommitGraph;
    /// use gitsketch::core::types::RefName;
    ///
    /// let mut graph = CommitGraph::new("doc", RefName::new("main").unwrap());
    /// let root = graph.create_commit(vec![], None).unwrap();
    /// let tip = graph.create_commit(vec![root.clone()], None).unwrap();
    /// graph.move_ref(&RefName::new("main").unwrap(), tip.clone()).unwrap();
    ///
    /// assert_eq!(graph.resolve("HEAD").unwrap(), tip);
    /// assert_eq!(graph.resolve("main~1").unwrap(), root);
    /// ```
    pub fn resolve(&self, spec: &str) -> Result<CommitId, GraphError> {
        let revision = Revision::parse(spec)
            .ok_or_else(|| GraphError::UnknownReference(spec.to_string()))?;

        let mut current = self.resolve_base(revision.base)?;
        for step in revision.steps {
            let commit = self
                .commit(&current)
                .ok_or_else(|| GraphError::UnknownReference(spec.to_string()))?;
            current = match step {
                Step::Ancestor(n) => {
                    let mut walk = commit;
                    for _ in 0..n {
                        let parent = walk
                            .parent()
                            .and_then(|p| self.commit(p))
                            .ok_or_else(|| GraphError::UnknownReference(spec.to_string()))?;
                        walk = parent;
                    }
                    walk.id.clone()
                }
                Step::Parent(0) => commit.id.clone(),
                Step::Parent(n) => commit
                    .parents
                    .get(n - 1)
                    .cloned()
                    .ok_or_else(|| GraphError::UnknownReference(spec.to_string()))?,
            };
        }
        Ok(current)
    }

    fn resolve_base(&self, base: &str) -> Result<CommitId, GraphError> {
        if base == "HEAD" || base == "@" {
            return self
                .head_commit()
                .cloned()
                .ok_or_else(|| GraphError::UnknownReference("HEAD".to_string()));
        }

        if let Ok(name) = RefName::new(base) {
            if let Some(r) = self.refs.get(&name) {
                return Ok(r.target.clone());
            }
        }

        if let Some(commit) = self
            .order
            .iter()
            .find(|id| id.as_str() == base)
        {
            return Ok(commit.clone());
        }

        if base.chars().count() >= MIN_PREFIX_LEN {
            let candidates: Vec<CommitId> = self
                .order
                .iter()
                .filter(|id| id.as_str().starts_with(base))
                .cloned()
                .collect();
            match candidates.as_slice() {
                [] => {}
                [only] => return Ok(only.clone()),
                _ => {
                    return Err(GraphError::AmbiguousReference {
                        reference: base.to_string(),
                        candidates,
                    })
                }
            }
        }

        Err(GraphError::UnknownReference(base.to_string()))
    }

    /// True if `ancestor` is reachable from `descendant` by following parent
    /// edges. Every commit is its own ancestor.
    pub fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> bool {
        if ancestor == descendant {
            return self.contains(ancestor);
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([descendant]);
        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(commit) = self.commits.get(current) {
                queue.extend(commit.parents.iter());
            }
        }
        false
    }

    /// All commits reachable from `tip`, including `tip`.
    pub fn ancestors(&self, tip: &CommitId) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([tip.clone()]);
        while let Some(current) = queue.pop_front() {
            if let Some(commit) = self.commits.get(&current) {
                if seen.insert(current) {
                    queue.extend(commit.parents.iter().cloned());
                }
            }
        }
        seen
    }

    /// Commits reachable from `tip` but not from `exclude`, oldest first.
    pub fn unique_ancestors(&self, tip: &CommitId, exclude: &CommitId) -> Vec<&Commit> {
        let excluded = self.ancestors(exclude);
        let included = self.ancestors(tip);
        self.commits()
            .filter(|c| included.contains(&c.id) && !excluded.contains(&c.id))
            .collect()
    }

    /// Commits reachable from any ref or from HEAD.
    pub fn reachable(&self) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let tips = self
            .refs
            .values()
            .map(|r| &r.target)
            .chain(self.head_commit());
        for tip in tips {
            if !seen.contains(tip) {
                seen.extend(self.ancestors(tip));
            }
        }
        seen
    }

    /// First common ancestor met by a breadth-first walk that advances both
    /// tips in turn. When both walks could claim the same commit, the side
    /// that reaches it first wins; `a` moves first in each round.
    ///
    /// # Example
    ///
    /// ```
    /// use gitsketch::core::graph::CommitGraph;
    /// use gitsketch::core::types::RefName;
    ///
    /// let mut graph = CommitGraph::new("doc", RefName::new("main").unwrap());
    /// let base = graph.create_commit(vec![], None).unwrap();
    /// let left = graph.create_commit(vec![base.clone()], None).unwrap();
    /// let right = graph.create_commit(vec![base.clone()], None).unwrap();
    ///
    /// assert_eq!(graph.merge_base(&left, &right).unwrap(), base);
    /// ```
    pub fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<CommitId, GraphError> {
        self.ensure_commit(a)?;
        self.ensure_commit(b)?;
        if a == b {
            return Ok(a.clone());
        }

        let mut seen_a = HashSet::from([a]);
        let mut seen_b = HashSet::from([b]);
        let mut queue_a = VecDeque::from([a]);
        let mut queue_b = VecDeque::from([b]);

        while !queue_a.is_empty() || !queue_b.is_empty() {
            if let Some(found) = self.bfs_step(&mut queue_a, &mut seen_a, &seen_b) {
                return Ok(found.clone());
            }
            if let Some(found) = self.bfs_step(&mut queue_b, &mut seen_b, &seen_a) {
                return Ok(found.clone());
            }
        }

        Err(GraphError::NoCommonAncestor(a.clone(), b.clone()))
    }

    /// Expand one node of a breadth-first walk. Returns the first parent
    /// already claimed by the other walk.
    fn bfs_step<'a>(
        &'a self,
        queue: &mut VecDeque<&'a CommitId>,
        seen: &mut HashSet<&'a CommitId>,
        other: &HashSet<&'a CommitId>,
    ) -> Option<&'a CommitId> {
        let current = queue.pop_front()?;
        let commit = self.commits.get(current)?;
        for parent in &commit.parents {
            if other.contains(parent) {
                return Some(parent);
            }
            if seen.insert(parent) {
                queue.push_back(parent);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> RefName {
        RefName::new(s).unwrap()
    }

    fn graph() -> CommitGraph {
        CommitGraph::new("test", name("main"))
    }

    /// main: a - b - c, HEAD on main.
    fn linear() -> (CommitGraph, Vec<CommitId>) {
        let mut g = graph();
        let a = g.create_commit(vec![], Some("a".into())).unwrap();
        let b = g.create_commit(vec![a.clone()], Some("b".into())).unwrap();
        let c = g.create_commit(vec![b.clone()], Some("c".into())).unwrap();
        g.move_ref(&name("main"), c.clone()).unwrap();
        (g, vec![a, b, c])
    }

    mod allocation {
        use super::*;

        #[test]
        fn ids_are_deterministic_per_seed() {
            let mut g1 = graph();
            let mut g2 = graph();
            let a1 = g1.create_commit(vec![], None).unwrap();
            let a2 = g2.create_commit(vec![], None).unwrap();
            assert_eq!(a1, a2);
            assert_eq!(a1.as_str().len(), 7);
        }

        #[test]
        fn different_seeds_differ() {
            let mut g1 = CommitGraph::new("local", name("main"));
            let mut g2 = CommitGraph::new("origin", name("main"));
            assert_ne!(
                g1.create_commit(vec![], None).unwrap(),
                g2.create_commit(vec![], None).unwrap()
            );
        }

        #[test]
        fn missing_parent_is_rejected() {
            let mut g = graph();
            let ghost = CommitId::new("ghost").unwrap();
            let err = g.create_commit(vec![ghost.clone()], None).unwrap_err();
            assert_eq!(err, GraphError::UnknownParent(ghost));
            assert!(g.is_empty());
        }

        #[test]
        fn create_commit_moves_no_ref() {
            let (mut g, ids) = linear();
            g.create_commit(vec![ids[2].clone()], None).unwrap();
            assert_eq!(g.branch_tip(&name("main")), Some(&ids[2]));
        }

        #[test]
        fn insert_rejects_duplicates() {
            let (mut g, ids) = linear();
            let err = g.insert_commit(ids[0].clone(), vec![], None, None).unwrap_err();
            assert_eq!(err, GraphError::DuplicateCommit(ids[0].clone()));
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn head_and_refs() {
            let (g, ids) = linear();
            assert_eq!(g.resolve("HEAD").unwrap(), ids[2]);
            assert_eq!(g.resolve("@").unwrap(), ids[2]);
            assert_eq!(g.resolve("main").unwrap(), ids[2]);
        }

        #[test]
        fn ancestry_steps() {
            let (g, ids) = linear();
            assert_eq!(g.resolve("HEAD~1").unwrap(), ids[1]);
            assert_eq!(g.resolve("HEAD~2").unwrap(), ids[0]);
            assert_eq!(g.resolve("HEAD^").unwrap(), ids[1]);
            assert_eq!(g.resolve("HEAD^^").unwrap(), ids[0]);
            assert_eq!(g.resolve("HEAD^0").unwrap(), ids[2]);
            assert!(matches!(
                g.resolve("HEAD~3"),
                Err(GraphError::UnknownReference(_))
            ));
        }

        #[test]
        fn second_parent() {
            let (mut g, ids) = linear();
            let side = g.create_commit(vec![ids[0].clone()], None).unwrap();
            let merge = g
                .create_commit(vec![ids[2].clone(), side.clone()], None)
                .unwrap();
            g.move_ref(&name("main"), merge).unwrap();
            assert_eq!(g.resolve("HEAD^2").unwrap(), side);
            assert_eq!(g.resolve("HEAD^2~1").unwrap(), ids[0]);
        }

        #[test]
        fn full_id_and_prefix() {
            let (g, ids) = linear();
            assert_eq!(g.resolve(ids[1].as_str()).unwrap(), ids[1]);
            assert_eq!(g.resolve(ids[1].short(5)).unwrap(), ids[1]);
        }

        #[test]
        fn short_prefix_is_not_matched() {
            let (g, ids) = linear();
            assert!(matches!(
                g.resolve(ids[1].short(3)),
                Err(GraphError::UnknownReference(_))
            ));
        }

        #[test]
        fn ambiguous_prefix() {
            let mut g = graph();
            let a = CommitId::new("abcd1111").unwrap();
            let b = CommitId::new("abcd2222").unwrap();
            g.insert_commit(a.clone(), vec![], None, None).unwrap();
            g.insert_commit(b.clone(), vec![a.clone()], None, None).unwrap();
            match g.resolve("abcd") {
                Err(GraphError::AmbiguousReference { candidates, .. }) => {
                    assert_eq!(candidates, vec![a, b]);
                }
                other => panic!("expected ambiguity, got {other:?}"),
            }
        }

        #[test]
        fn empty_graph_head_is_unknown() {
            let g = graph();
            assert_eq!(
                g.resolve("HEAD"),
                Err(GraphError::UnknownReference("HEAD".into()))
            );
        }
    }

    mod ancestry {
        use super::*;

        #[test]
        fn reflexive() {
            let (g, ids) = linear();
            for id in &ids {
                assert!(g.is_ancestor(id, id));
            }
        }

        #[test]
        fn direction_matters() {
            let (g, ids) = linear();
            assert!(g.is_ancestor(&ids[0], &ids[2]));
            assert!(!g.is_ancestor(&ids[2], &ids[0]));
        }

        #[test]
        fn unique_ancestors_in_topological_order() {
            let (mut g, ids) = linear();
            let x = g.create_commit(vec![ids[0].clone()], None).unwrap();
            let y = g.create_commit(vec![x.clone()], None).unwrap();
            let unique: Vec<_> = g
                .unique_ancestors(&y, &ids[2])
                .into_iter()
                .map(|c| c.id.clone())
                .collect();
            assert_eq!(unique, vec![x, y]);
        }

        #[test]
        fn merge_base_of_fork() {
            let (mut g, ids) = linear();
            let side = g.create_commit(vec![ids[1].clone()], None).unwrap();
            assert_eq!(g.merge_base(&ids[2], &side).unwrap(), ids[1]);
            assert_eq!(g.merge_base(&side, &ids[2]).unwrap(), ids[1]);
        }

        #[test]
        fn merge_base_with_ancestor_is_ancestor() {
            let (g, ids) = linear();
            assert_eq!(g.merge_base(&ids[2], &ids[0]).unwrap(), ids[0]);
            assert_eq!(g.merge_base(&ids[0], &ids[2]).unwrap(), ids[0]);
        }

        #[test]
        fn merge_base_of_unrelated_roots_fails() {
            let mut g = graph();
            let a = g.create_commit(vec![], None).unwrap();
            let b = g.create_commit(vec![], None).unwrap();
            assert!(matches!(
                g.merge_base(&a, &b),
                Err(GraphError::NoCommonAncestor(_, _))
            ));
        }

        #[test]
        fn reachable_covers_refs_and_head() {
            let (mut g, ids) = linear();
            let dangling = g.create_commit(vec![ids[2].clone()], None).unwrap();
            let reachable = g.reachable();
            assert!(ids.iter().all(|id| reachable.contains(id)));
            assert!(!reachable.contains(&dangling));

            g.detach_head(dangling.clone()).unwrap();
            assert!(g.reachable().contains(&dangling));
        }
    }

    mod head {
        use super::*;

        #[test]
        fn checkout_branch_attaches() {
            let (mut g, ids) = linear();
            g.create_ref(name("topic"), RefKind::Branch, ids[0].clone())
                .unwrap();
            let previous = g.checkout("topic").unwrap();
            assert_eq!(previous, Head::Attached(name("main")));
            assert_eq!(g.head(), &Head::Attached(name("topic")));
            assert_eq!(g.head_commit(), Some(&ids[0]));
        }

        #[test]
        fn checkout_commit_detaches() {
            let (mut g, ids) = linear();
            g.checkout(ids[1].as_str()).unwrap();
            assert_eq!(g.head(), &Head::Detached(ids[1].clone()));
        }

        #[test]
        fn checkout_tag_detaches() {
            let (mut g, ids) = linear();
            g.create_ref(name("v1"), RefKind::Tag, ids[0].clone()).unwrap();
            g.checkout("v1").unwrap();
            assert_eq!(g.head(), &Head::Detached(ids[0].clone()));
        }

        #[test]
        fn advance_creates_unborn_branch() {
            let mut g = graph();
            let root = g.create_commit(vec![], None).unwrap();
            let (moved, previous) = g.advance_head(root.clone()).unwrap();
            assert_eq!(moved, Some(name("main")));
            assert_eq!(previous, None);
            assert_eq!(g.branch_tip(&name("main")), Some(&root));
        }

        #[test]
        fn rename_follows_head_and_default() {
            let (mut g, ids) = linear();
            g.rename_ref(&name("main"), &name("trunk")).unwrap();
            assert_eq!(g.head(), &Head::Attached(name("trunk")));
            assert_eq!(g.default_branch(), &name("trunk"));
            assert_eq!(g.branch_tip(&name("trunk")), Some(&ids[2]));
            assert!(g.get_ref(&name("main")).is_none());
        }
    }

    mod patch_identity {
        use super::*;

        #[test]
        fn copies_share_source_patch() {
            let (mut g, ids) = linear();
            let copy = g
                .create_derived_commit(
                    vec![ids[0].clone()],
                    None,
                    Some(CommitOrigin::Rebase(ids[2].clone())),
                )
                .unwrap();
            let copy_of_copy = g
                .create_derived_commit(
                    vec![ids[1].clone()],
                    None,
                    Some(CommitOrigin::CherryPick(copy.clone())),
                )
                .unwrap();
            let commit = g.commit(&copy_of_copy).unwrap();
            assert_eq!(commit.patch_id(&g), &ids[2]);
        }
    }
}
