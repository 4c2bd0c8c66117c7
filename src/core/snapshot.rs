//! core::snapshot
//!
//! Snapshot codec: one view's full state as a JSON token.
//!
//! # Token Format
//!
//! ```json
//! {
//!   "name": "ExplainGitZen",
//!   "seed": "ExplainGitZen",
//!   "defaultBranch": "main",
//!   "generation": 3,
//!   "commitData": [
//!     { "id": "e137e9b", "parents": [], "message": "init",
//!       "tags": ["main", "v1"], "cx": 30, "cy": 200 }
//!   ],
//!   "branches": ["main", "origin/main"],
//!   "currentBranch": "main",
//!   "head": null,
//!   "logs": { "main": [ { "previous": null, "new": "e137e9b", "reason": "commit (initial): init" } ] },
//!   "width": 883, "height": 400, "commitRadius": 15
//! }
//! ```
//!
//! - `tags` lists every label on a commit. Labels also listed in `branches`
//!   are branches (remote-tracking when prefixed with `<remote>/`); the rest
//!   are tags.
//! - `currentBranch` is `null` and `head` holds the commit id when HEAD is
//!   detached.
//!
//! # Legacy Inputs
//!
//! Decoding accepts older tokens:
//! - `parent` / `parent2` instead of `parents`
//! - `destination` instead of `new` in reflog entries
//! - `currentBranch: "HEAD"` with the commit tagged `HEAD` meaning detached
//! - legacy default-branch names (`master`), renamed everywhere when the
//!   token has no `defaultBranch` or names a legacy one there. Tokens that
//!   record a current default branch decode as written, so a branch the user
//!   named `master` survives.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph::{CommitGraph, CommitOrigin, Head, RefKind};
use super::layout::{Dimensions, Layout, Point};
use super::naming::Relabel;
use super::reflog::{Reflog, ReflogEntry};
use super::state::{GraphState, ViewMeta};
use super::types::{CommitId, RefName, TypeError};
use super::verify::fast_verify;

/// Label marking the detached HEAD commit in legacy tokens.
const LEGACY_HEAD_LABEL: &str = "HEAD";

/// Errors from snapshot decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("malformed snapshot: {0}")]
    InvalidValue(#[from] TypeError),
}

/// Wire form of a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(default)]
    pub commit_data: Vec<CommitRecord>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub current_branch: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub logs: BTreeMap<String, Vec<LogRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_radius: Option<i32>,
}

/// Wire form of a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cx: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<CommitOrigin>,
}

impl CommitRecord {
    /// Parents in order, merging the legacy `parent` / `parent2` fields.
    fn all_parents(&self) -> Vec<&str> {
        if !self.parents.is_empty() {
            return self.parents.iter().map(String::as_str).collect();
        }
        self.parent
            .iter()
            .chain(self.parent2.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Wire form of a reflog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, alias = "destination")]
    pub new: Option<String>,
    #[serde(default)]
    pub reason: String,
}

/// Encodes and decodes [`GraphState`] tokens.
#[derive(Debug, Clone)]
pub struct SnapshotCodec {
    default_branch: RefName,
    legacy_default_branches: Vec<String>,
    remote_name: String,
    dimensions: Dimensions,
}

impl SnapshotCodec {
    pub fn new(default_branch: RefName, remote_name: impl Into<String>) -> Self {
        Self {
            default_branch,
            legacy_default_branches: vec!["master".to_string()],
            remote_name: remote_name.into(),
            dimensions: Dimensions::default(),
        }
    }

    /// Names renamed to the default branch when decoding.
    pub fn with_legacy_names(mut self, names: Vec<String>) -> Self {
        self.legacy_default_branches = names;
        self
    }

    /// Dimensions used when a token does not carry its own.
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Serialize a state to a token.
    ///
    /// # Errors
    ///
    /// Only fails if JSON encoding fails, which does not happen for valid
    /// states.
    pub fn serialize(&self, state: &GraphState) -> Result<String, SnapshotError> {
        let view = self.to_view(state);
        serde_json::to_string(&view).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    /// Build the wire form of a state.
    pub fn to_view(&self, state: &GraphState) -> ViewSnapshot {
        let graph = &state.graph;

        let commit_data = graph
            .commits()
            .map(|commit| {
                let point = state.layout.position(&commit.id);
                CommitRecord {
                    id: commit.id.to_string(),
                    parents: commit.parents.iter().map(ToString::to_string).collect(),
                    parent: None,
                    parent2: None,
                    message: commit.message.clone(),
                    tags: graph
                        .labels_for(&commit.id)
                        .into_iter()
                        .map(ToString::to_string)
                        .collect(),
                    cx: point.map(|p| p.cx),
                    cy: point.map(|p| p.cy),
                    origin: commit.origin.clone(),
                }
            })
            .collect();

        let branches = graph
            .refs()
            .filter(|(_, r)| r.kind != RefKind::Tag)
            .map(|(name, _)| name.to_string())
            .collect();

        let (current_branch, head) = match graph.head() {
            Head::Attached(name) => (Some(name.to_string()), None),
            Head::Detached(id) => (None, Some(id.to_string())),
        };

        let logs = state
            .reflog
            .logs()
            .map(|(name, entries)| {
                let records = entries
                    .iter()
                    .map(|entry| LogRecord {
                        previous: entry.previous.as_ref().map(ToString::to_string),
                        new: Some(entry.new.to_string()),
                        reason: entry.reason.clone(),
                    })
                    .collect();
                (name.to_string(), records)
            })
            .collect();

        let dims = state.layout.dimensions();
        ViewSnapshot {
            name: Some(state.meta.name.clone()),
            remote_name: state.meta.remote_name.clone(),
            seed: Some(graph.seed().to_string()),
            default_branch: Some(graph.default_branch().to_string()),
            generation: Some(graph.generation()),
            commit_data,
            branches,
            current_branch,
            head,
            logs,
            width: Some(dims.width),
            height: Some(dims.height),
            commit_radius: Some(dims.commit_radius),
        }
    }

    /// Decode a token into a state, renaming legacy default-branch labels
    /// in legacy tokens.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` for invalid JSON, dangling parents,
    /// parent cycles, labels that appear twice, or a HEAD that does not
    /// resolve.
    pub fn deserialize(&self, token: &str) -> Result<GraphState, SnapshotError> {
        let mut view: ViewSnapshot =
            serde_json::from_str(token).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        self.normalize_view(&mut view);
        self.from_view(view)
    }

    /// Rewrite legacy default-branch labels in a token.
    ///
    /// Returns the token unchanged if it is not valid JSON.
    pub fn normalize_token(&self, token: &str) -> String {
        let Ok(mut view) = serde_json::from_str::<ViewSnapshot>(token) else {
            return token.to_string();
        };
        self.normalize_view(&mut view);
        serde_json::to_string(&view).unwrap_or_else(|_| token.to_string())
    }

    /// Rewrite legacy default-branch labels in a wire view, in place.
    ///
    /// Only views whose `defaultBranch` is missing or legacy are touched.
    pub fn normalize_view(&self, view: &mut ViewSnapshot) {
        for legacy in &self.legacy_default_branches {
            let relabel =
                Relabel::new(legacy, self.default_branch.as_str()).with_remote(&self.remote_name);
            if relabel.is_noop() || !names_legacy_default(view, legacy) {
                continue;
            }

            for commit in &mut view.commit_data {
                for tag in &mut commit.tags {
                    *tag = relabel.label_or_keep(tag);
                }
            }
            for branch in &mut view.branches {
                *branch = relabel.label_or_keep(branch);
            }
            if let Some(current) = view.current_branch.as_mut() {
                *current = relabel.label_or_keep(current);
            }
            view.default_branch = Some(self.default_branch.to_string());

            let logs = std::mem::take(&mut view.logs);
            for (name, entries) in logs {
                let target = view.logs.entry(relabel.label_or_keep(&name)).or_default();
                target.extend(entries.into_iter().map(|mut entry| {
                    entry.reason = relabel.text(&entry.reason);
                    entry
                }));
            }
        }
    }

    /// Build a state from an already normalized wire view.
    pub fn from_view(&self, view: ViewSnapshot) -> Result<GraphState, SnapshotError> {
        let name = view.name.clone().unwrap_or_default();
        let seed = view.seed.clone().unwrap_or_else(|| name.clone());
        let default_branch = match view.default_branch.as_deref() {
            Some(branch) => RefName::new(branch)?,
            None => self.default_branch.clone(),
        };

        let mut graph = CommitGraph::new(seed, default_branch.clone());
        insert_topologically(&mut graph, &view.commit_data)?;
        let head_label_commit = attach_labels(&mut graph, &view, &self.remote_name)?;
        restore_head(&mut graph, &view, head_label_commit, default_branch)?;
        graph.set_generation(view.generation.unwrap_or(graph.len() as u64));

        let mut reflog = Reflog::new();
        for (name, entries) in &view.logs {
            for entry in entries {
                let new = entry.new.as_deref().ok_or_else(|| {
                    SnapshotError::Malformed(format!("reflog entry for {name} has no target"))
                })?;
                reflog.push(ReflogEntry {
                    name: name.clone(),
                    previous: entry.previous.clone().map(CommitId::new).transpose()?,
                    new: CommitId::new(new)?,
                    reason: entry.reason.clone(),
                });
            }
        }

        let defaults = self.dimensions;
        let mut layout = Layout::new(Dimensions {
            width: view.width.unwrap_or(defaults.width),
            height: view.height.unwrap_or(defaults.height),
            commit_radius: view.commit_radius.unwrap_or(defaults.commit_radius),
        });
        for record in &view.commit_data {
            if let (Some(cx), Some(cy)) = (record.cx, record.cy) {
                layout.set(CommitId::new(record.id.as_str())?, Point { cx, cy });
            }
        }
        layout.place_missing(&graph);

        if let Err(err) = fast_verify(&graph).into_result() {
            return Err(SnapshotError::Malformed(err.to_string()));
        }

        Ok(GraphState {
            graph,
            reflog,
            layout,
            meta: ViewMeta {
                name,
                remote_name: view.remote_name,
            },
        })
    }
}

/// Insert commits so that parents always come first, keeping the record
/// order otherwise.
fn insert_topologically(
    graph: &mut CommitGraph,
    records: &[CommitRecord],
) -> Result<(), SnapshotError> {
    let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    if known.len() != records.len() {
        return Err(SnapshotError::Malformed("duplicate commit id".into()));
    }
    for record in records {
        if let Some(missing) = record.all_parents().into_iter().find(|p| !known.contains(p)) {
            return Err(SnapshotError::Malformed(format!(
                "commit {} has unknown parent {missing}",
                record.id
            )));
        }
    }

    let mut pending: Vec<&CommitRecord> = records.iter().collect();
    while !pending.is_empty() {
        let before = pending.len();
        let mut waiting = Vec::new();
        for record in pending {
            let parents = record.all_parents();
            let ready = parents
                .iter()
                .all(|p| CommitId::new(*p).map(|id| graph.contains(&id)).unwrap_or(false));
            if !ready {
                waiting.push(record);
                continue;
            }
            let parents = parents
                .into_iter()
                .map(CommitId::new)
                .collect::<Result<Vec<_>, _>>()?;
            graph
                .insert_commit(
                    CommitId::new(record.id.as_str())?,
                    parents,
                    record.message.clone(),
                    record.origin.clone(),
                )
                .map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        }
        if waiting.len() == before {
            return Err(SnapshotError::Malformed(format!(
                "parent cycle through commit {}",
                waiting[0].id
            )));
        }
        pending = waiting;
    }
    Ok(())
}

/// Create refs from commit labels. Returns the commit carrying the legacy
/// `HEAD` label, if any.
fn attach_labels(
    graph: &mut CommitGraph,
    view: &ViewSnapshot,
    remote_name: &str,
) -> Result<Option<CommitId>, SnapshotError> {
    let branches: HashSet<&str> = view.branches.iter().map(String::as_str).collect();
    let remote = view.remote_name.as_deref().unwrap_or(remote_name);
    let mut head_commit = None;
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for record in &view.commit_data {
        let id = CommitId::new(record.id.as_str())?;
        for label in &record.tags {
            if label == LEGACY_HEAD_LABEL {
                head_commit = Some(id.clone());
                continue;
            }
            if let Some(other) = seen.insert(label.as_str(), record.id.as_str()) {
                return Err(SnapshotError::Malformed(format!(
                    "label {label} is on both {other} and {}",
                    record.id
                )));
            }

            let name = RefName::new(label.as_str())?;
            let kind = if !branches.contains(label.as_str()) {
                RefKind::Tag
            } else if name.strip_remote(remote).is_some() {
                RefKind::Remote
            } else {
                RefKind::Branch
            };
            graph
                .create_ref(name, kind, id.clone())
                .map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        }
    }

    Ok(head_commit)
}

fn restore_head(
    graph: &mut CommitGraph,
    view: &ViewSnapshot,
    head_label_commit: Option<CommitId>,
    default_branch: RefName,
) -> Result<(), SnapshotError> {
    let detach = |graph: &mut CommitGraph, id: CommitId| {
        graph
            .detach_head(id)
            .map_err(|e| SnapshotError::Malformed(e.to_string()))
    };

    if let Some(head) = view.head.as_deref() {
        return detach(graph, CommitId::new(head)?);
    }

    match view.current_branch.as_deref() {
        Some(LEGACY_HEAD_LABEL) | None => match head_label_commit {
            Some(id) => detach(graph, id),
            None if view.current_branch.is_some() => Err(SnapshotError::Malformed(
                "detached HEAD without a HEAD-labelled commit".into(),
            )),
            None => {
                graph.attach_head(default_branch);
                Ok(())
            }
        },
        Some(branch) => {
            graph.attach_head(RefName::new(branch)?);
            Ok(())
        }
    }
}

/// Whether a view predates `defaultBranch` or records `legacy` as its default.
fn names_legacy_default(view: &ViewSnapshot, legacy: &str) -> bool {
    match view.default_branch.as_deref() {
        Some(branch) => branch == legacy,
        None => true,
    }
}
