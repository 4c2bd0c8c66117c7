//! engine::interpreter
//!
//! Applies typed commands to a [`Workspace`].
//!
//! # Transactions
//!
//! Every command runs against a clone of the workspace. The clone is
//! verified and laid out, then swapped in. A failing command therefore
//! leaves no trace: not in the graph, the reflog or the layout.
//!
//! # Reflog
//!
//! Each moved name gets one entry, in the order the names moved. When a
//! command moves the checked-out branch, the branch entry comes first and
//! the HEAD entry second, both with the same reason.
//!
//! # Example
//!
//! ```
//! use gitsketch::core::layout::Dimensions;
//! use gitsketch::core::state::GraphState;
//! use gitsketch::core::types::RefName;
//! use gitsketch::engine::interpreter::{Interpreter, Workspace};
//!
//! let local = GraphState::new("demo", RefName::new("main").unwrap(), Dimensions::default(), None);
//! let mut interpreter = Interpreter::new(Workspace::new(local, None));
//!
//! assert!(interpreter.run_line("git commit -m first").is_success());
//! assert!(interpreter.run_line("checkout -b topic").is_success());
//! assert!(interpreter.run_line("merge nowhere").is_failed());
//! assert_eq!(interpreter.workspace().local.graph.len(), 1);
//! ```

use std::collections::HashSet;

use super::command::{
    BranchAction, Command, CommandError, CommandOutput, CreateBranch, Outcome, TagAction,
};
use super::flags::{parse_flags, tokenize, translate_switch, FlagMap};
use super::remote;
use crate::core::graph::{CommitGraph, CommitOrigin, GraphError, Head, RefKind};
use crate::core::reflog::HEAD;
use crate::core::state::GraphState;
use crate::core::types::{CommitId, RefName};
use crate::core::verify::fast_verify;

/// Length of the ids shown in messages.
pub const SHORT_ID: usize = 7;

/// The local view plus the optional simulated origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub local: GraphState,
    pub origin: Option<GraphState>,
}

impl Workspace {
    pub fn new(local: GraphState, origin: Option<GraphState>) -> Self {
        Self { local, origin }
    }
}

/// Executes commands against a workspace it owns.
#[derive(Debug, Clone)]
pub struct Interpreter {
    workspace: Workspace,
}

impl Interpreter {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Swap in a different workspace (undo, redo, restore), returning the old one.
    pub fn replace(&mut self, workspace: Workspace) -> Workspace {
        std::mem::replace(&mut self.workspace, workspace)
    }

    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }

    /// Tokenize and execute one input line. A leading `git` is optional.
    pub fn run_line(&mut self, line: &str) -> CommandOutput<Outcome> {
        self.try_run_line(line).into()
    }

    fn try_run_line(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let words = tokenize(line).map_err(|e| CommandError::MissingArgument {
            command: "input".into(),
            what: e.to_string(),
        })?;
        let words = match words.split_first() {
            Some((first, rest)) if first == "git" => rest,
            _ => words.as_slice(),
        };
        let Some((name, rest)) = words.split_first() else {
            return Err(CommandError::MissingArgument {
                command: "git".into(),
                what: "a command".into(),
            });
        };

        let flags = parse_flags(rest);
        self.execute(name, &flags.positional, &flags, line)
    }

    /// Execute one command.
    ///
    /// `args` are the positional arguments. `switch` is rewritten into
    /// `checkout` before it is typed; every other command takes `args` as
    /// its positionals.
    pub fn execute(
        &mut self,
        name: &str,
        args: &[String],
        flags: &FlagMap,
        raw: &str,
    ) -> Result<Outcome, CommandError> {
        let (name, flags) = match name {
            "switch" => {
                let (args, mut flags) = translate_switch(args, flags.clone());
                flags.positional = args;
                ("checkout", flags)
            }
            _ => {
                let mut flags = flags.clone();
                flags.positional = args.to_vec();
                (name, flags)
            }
        };

        let command = Command::parse(name, &flags)?;
        let mut outcome = self.apply(&command)?;
        outcome.command = raw.to_string();
        Ok(outcome)
    }

    /// Apply a typed command transactionally.
    pub fn apply(&mut self, command: &Command) -> Result<Outcome, CommandError> {
        let mut next = self.workspace.clone();
        let outcome = dispatch(&mut next, command)?;

        if !outcome.changed {
            return Ok(outcome);
        }

        fast_verify(&next.local.graph).into_result()?;
        next.local.layout.place_missing(&next.local.graph);
        if let Some(origin) = next.origin.as_mut() {
            fast_verify(&origin.graph).into_result()?;
            origin.layout.place_missing(&origin.graph);
        }

        self.workspace = next;
        Ok(outcome)
    }
}

fn dispatch(ws: &mut Workspace, command: &Command) -> Result<Outcome, CommandError> {
    let state = &mut ws.local;
    match command {
        Command::Commit { message, amend } => commit(state, message.as_deref(), *amend),
        Command::Branch(action) => branch(state, action),
        Command::Checkout {
            create,
            target,
            detach,
        } => checkout(state, create.as_ref(), target.as_deref(), *detach),
        Command::Merge {
            target,
            no_ff,
            message,
        } => merge(state, target, *no_ff, message.clone(), "merge"),
        Command::Rebase { upstream } => rebase(state, upstream),
        Command::Reset { target, .. } => reset(state, target.as_deref().unwrap_or(HEAD)),
        Command::Revert { target } => revert(state, target),
        Command::Tag(action) => tag(state, action),
        Command::CherryPick { revisions } => cherry_pick(state, revisions),
        Command::Reflog { name } => Ok(Outcome::listing(
            state.reflog.display(name.as_deref().unwrap_or(HEAD)),
        )),
        Command::Log { target } => log(&state.graph, target.as_deref().unwrap_or(HEAD)),
        Command::Fetch => remote::fetch(ws),
        Command::Push {
            remote: name,
            branch,
            force,
        } => remote::push(ws, name.as_deref(), branch.as_deref(), *force),
        Command::Pull => remote::pull(ws),
    }
}

// =============================================================================
// Helpers shared with engine::remote
// =============================================================================

pub(crate) fn short(id: &CommitId) -> &str {
    id.short(SHORT_ID)
}

/// The commit HEAD resolves to, or an error naming HEAD.
pub(crate) fn head_commit(graph: &CommitGraph) -> Result<CommitId, CommandError> {
    graph
        .head_commit()
        .cloned()
        .ok_or_else(|| GraphError::UnknownReference(HEAD.to_string()).into())
}

/// Move whatever HEAD follows to `target` and journal it.
pub(crate) fn advance(
    state: &mut GraphState,
    target: &CommitId,
    reason: &str,
) -> Result<(), CommandError> {
    advance_with(state, target, reason, reason)
}

/// Like [`advance`], with separate reasons for the branch and HEAD entries.
pub(crate) fn advance_with(
    state: &mut GraphState,
    target: &CommitId,
    branch_reason: &str,
    head_reason: &str,
) -> Result<(), CommandError> {
    let (moved, previous) = state.graph.advance_head(target.clone())?;
    if let Some(name) = moved {
        state
            .reflog
            .append(name.as_str(), previous.clone(), target.clone(), branch_reason);
    }
    state
        .reflog
        .append(HEAD, previous, target.clone(), head_reason);
    Ok(())
}

/// Where new commits land, as shown in `[main abc1234]` headers.
fn position(graph: &CommitGraph) -> String {
    match graph.head() {
        Head::Attached(name) => name.to_string(),
        Head::Detached(_) => "detached HEAD".to_string(),
    }
}

fn subject(graph: &CommitGraph, id: &CommitId) -> String {
    graph
        .commit(id)
        .and_then(|c| c.message.clone())
        .unwrap_or_else(|| short(id).to_string())
}

/// Merge `spec` into HEAD. Shared by `merge` and `pull`.
pub(crate) fn merge(
    state: &mut GraphState,
    spec: &str,
    no_ff: bool,
    message: Option<String>,
    reason_prefix: &str,
) -> Result<Outcome, CommandError> {
    let target = state.graph.resolve(spec)?;
    let label = if reason_prefix == "merge" {
        format!("merge {spec}")
    } else {
        reason_prefix.to_string()
    };

    let Some(head) = state.graph.head_commit().cloned() else {
        advance(state, &target, &format!("{label}: Fast-forward"))?;
        return Ok(Outcome::changed("Fast-forward"));
    };

    if state.graph.is_ancestor(&target, &head) {
        return Ok(Outcome::unchanged("Already up to date."));
    }

    if !no_ff && state.graph.is_ancestor(&head, &target) {
        advance(state, &target, &format!("{label}: Fast-forward"))?;
        return Ok(Outcome::changed(format!(
            "Updating {}..{}\nFast-forward",
            short(&head),
            short(&target)
        )));
    }

    state.graph.merge_base(&head, &target)?;

    let is_branch = RefName::new(spec)
        .ok()
        .and_then(|name| state.graph.get_ref(&name).map(|r| r.kind))
        .is_some_and(|kind| kind != RefKind::Tag);
    let message = message.unwrap_or_else(|| {
        if is_branch {
            format!("Merge branch '{spec}'")
        } else {
            format!("Merge commit '{spec}'")
        }
    });

    let merged = state
        .graph
        .create_commit(vec![head, target], Some(message))?;
    advance(
        state,
        &merged,
        &format!("{label}: Merge made by the 'ort' strategy."),
    )?;
    Ok(Outcome::changed(format!(
        "Merge made by the 'ort' strategy. [{}]",
        short(&merged)
    )))
}

// =============================================================================
// Handlers
// =============================================================================

fn commit(
    state: &mut GraphState,
    message: Option<&str>,
    amend: bool,
) -> Result<Outcome, CommandError> {
    let graph = &mut state.graph;

    let (id, kind) = if amend {
        let head = head_commit(graph)?;
        let replaced = graph
            .commit(&head)
            .cloned()
            .ok_or_else(|| GraphError::UnknownReference(head.to_string()))?;
        let message = message.map(str::to_string).or(replaced.message);
        let id = graph.create_derived_commit(
            replaced.parents,
            message,
            Some(CommitOrigin::Amend(head)),
        )?;
        (id, "commit (amend)")
    } else {
        let parents: Vec<CommitId> = graph.head_commit().cloned().into_iter().collect();
        let kind = if parents.is_empty() {
            "commit (initial)"
        } else {
            "commit"
        };
        (graph.create_commit(parents, message.map(str::to_string))?, kind)
    };

    let text = subject(&state.graph, &id);
    advance(state, &id, &format!("{kind}: {text}"))?;

    Ok(Outcome::changed(format!(
        "[{} {}] {text}",
        position(&state.graph),
        short(&id)
    )))
}

fn branch(state: &mut GraphState, action: &BranchAction) -> Result<Outcome, CommandError> {
    match action {
        BranchAction::List { all } => Ok(Outcome::listing(list_branches(&state.graph, *all))),
        BranchAction::Create { name, start, force } => {
            let name = RefName::new(name.as_str())?;
            reject_remote_prefix(state, &name)?;
            let spec = start.as_deref().unwrap_or(HEAD);
            let target = state
                .graph
                .resolve(spec)
                .map_err(|_| CommandError::InvalidStartPoint(spec.to_string()))?;

            let reason = match state.graph.get_ref(&name) {
                None => format!("branch: Created from {spec}"),
                Some(existing) if existing.kind != RefKind::Branch || !force => {
                    return Err(GraphError::RefAlreadyExists(name).into())
                }
                Some(_) if state.graph.current_branch() == Some(&name) => {
                    return Err(CommandError::CannotForceCurrentBranch(name))
                }
                Some(_) => format!("branch: Reset to {spec}"),
            };

            let previous = state.graph.move_ref(&name, target.clone())?;
            state
                .reflog
                .append(name.as_str(), previous, target.clone(), reason);
            Ok(Outcome::changed(format!(
                "Branch '{name}' set to {}",
                short(&target)
            )))
        }
        BranchAction::Delete { names, force } => {
            let mut lines = Vec::new();
            for raw in names {
                let name = RefName::new(raw.as_str())?;
                let tip = state
                    .graph
                    .branch_tip(&name)
                    .cloned()
                    .ok_or_else(|| GraphError::UnknownReference(raw.clone()))?;
                if state.graph.current_branch() == Some(&name) {
                    return Err(CommandError::CannotDeleteCurrentBranch(name));
                }
                if !force {
                    let merged = state
                        .graph
                        .head_commit()
                        .is_some_and(|head| state.graph.is_ancestor(&tip, head));
                    if !merged {
                        return Err(CommandError::BranchNotMerged(name));
                    }
                }
                state.graph.delete_ref(&name)?;
                state.reflog.remove(name.as_str());
                lines.push(format!("Deleted branch {name} (was {}).", short(&tip)));
            }
            let message = lines.join("\n");
            Ok(Outcome::changed(message))
        }
    }
}

fn reject_remote_prefix(state: &GraphState, name: &RefName) -> Result<(), CommandError> {
    match state.meta.remote_name.as_deref() {
        Some(remote) if name.strip_remote(remote).is_some() => Err(CommandError::NotABranch(
            name.clone(),
            "remote-tracking name",
        )),
        _ => Ok(()),
    }
}

fn list_branches(graph: &CommitGraph, all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Head::Detached(id) = graph.head() {
        lines.push(format!("* (HEAD detached at {})", short(id)));
    }
    for (name, _) in graph.refs_of_kind(RefKind::Branch) {
        let marker = if graph.current_branch() == Some(name) {
            '*'
        } else {
            ' '
        };
        lines.push(format!("{marker} {name}"));
    }
    if all {
        for (name, _) in graph.refs_of_kind(RefKind::Remote) {
            lines.push(format!("  remotes/{name}"));
        }
    }
    lines
}

fn checkout(
    state: &mut GraphState,
    create: Option<&CreateBranch>,
    target: Option<&str>,
    detach: bool,
) -> Result<Outcome, CommandError> {
    let from = state.graph.head().describe();
    let previous = state.graph.head_commit().cloned();

    if let Some(create) = create {
        let name = RefName::new(create.name.as_str())?;
        reject_remote_prefix(state, &name)?;

        // Nothing committed yet: the unborn branch just changes its name.
        if state.graph.is_empty() && target.is_none() {
            if state.graph.get_ref(&name).is_some() {
                return Err(GraphError::RefAlreadyExists(name).into());
            }
            state.graph.attach_head(name.clone());
            return Ok(Outcome::changed(format!("Switched to a new branch '{name}'")));
        }

        let spec = target.unwrap_or(HEAD);
        let start = state
            .graph
            .resolve(spec)
            .map_err(|_| CommandError::InvalidStartPoint(spec.to_string()))?;

        let (reason, message) = match state.graph.get_ref(&name) {
            None => (
                format!("branch: Created from {spec}"),
                format!("Switched to a new branch '{name}'"),
            ),
            Some(existing) if existing.kind != RefKind::Branch || !create.force => {
                return Err(GraphError::RefAlreadyExists(name).into())
            }
            Some(_) => (
                format!("branch: Reset to {spec}"),
                format!("Switched to and reset branch '{name}'"),
            ),
        };

        let old = state.graph.move_ref(&name, start.clone())?;
        state.reflog.append(name.as_str(), old, start.clone(), reason);
        state.graph.attach_head(name.clone());
        state.reflog.append(
            HEAD,
            previous,
            start,
            format!("checkout: moving from {from} to {name}"),
        );
        return Ok(Outcome::changed(message));
    }

    let Some(spec) = target else {
        return Err(CommandError::MissingArgument {
            command: "checkout".into(),
            what: "the branch or commit to check out".into(),
        });
    };

    if detach {
        let id = state.graph.resolve(spec)?;
        state.graph.detach_head(id.clone())?;
    } else if let Some((name, tracking, tip)) = tracking_for_new_branch(state, spec)? {
        state.graph.create_ref(name.clone(), RefKind::Branch, tip.clone())?;
        state.reflog.append(
            name.as_str(),
            None,
            tip,
            format!("branch: Created from {tracking}"),
        );
        state.graph.attach_head(name);
    } else {
        state.graph.checkout(spec)?;
    }

    let now = state.graph.head().clone();
    let Some(current) = state.graph.head_commit().cloned() else {
        return Err(GraphError::UnknownReference(spec.to_string()).into());
    };

    if now.describe() == from && previous.as_ref() == Some(&current) {
        let message = match &now {
            Head::Attached(name) => format!("Already on '{name}'"),
            Head::Detached(id) => format!("HEAD is now at {}", short(id)),
        };
        return Ok(Outcome::unchanged(message));
    }

    state.reflog.append(
        HEAD,
        previous,
        current.clone(),
        format!("checkout: moving from {from} to {spec}"),
    );

    let message = match &now {
        Head::Attached(name) => format!("Switched to branch '{name}'"),
        Head::Detached(id) => format!(
            "HEAD is now at {} {}",
            short(id),
            subject(&state.graph, id)
        ),
    };
    Ok(Outcome::changed(message))
}

/// If `spec` names no local branch but `<remote>/<spec>` exists, the branch
/// to create, the tracking ref it comes from and where it starts.
fn tracking_for_new_branch(
    state: &GraphState,
    spec: &str,
) -> Result<Option<(RefName, RefName, CommitId)>, CommandError> {
    let Some(remote) = state.meta.remote_name.as_deref() else {
        return Ok(None);
    };
    let Ok(name) = RefName::new(spec) else {
        return Ok(None);
    };
    if state.graph.get_ref(&name).is_some() {
        return Ok(None);
    }
    let tracking = RefName::remote_tracking(remote, &name)?;
    Ok(state
        .graph
        .get_ref(&tracking)
        .filter(|r| r.kind == RefKind::Remote)
        .map(|r| (name, tracking.clone(), r.target.clone())))
}

fn rebase(state: &mut GraphState, upstream: &str) -> Result<Outcome, CommandError> {
    let onto = state.graph.resolve(upstream)?;
    let head = head_commit(&state.graph)?;
    let position = state.graph.head().describe();

    if state.graph.is_ancestor(&onto, &head) {
        return Ok(Outcome::unchanged(format!(
            "Current branch {position} is up to date."
        )));
    }

    if state.graph.is_ancestor(&head, &onto) {
        advance(
            state,
            &onto,
            &format!("rebase (finish): {position} onto {}", onto),
        )?;
        return Ok(Outcome::changed(format!(
            "Fast-forwarded {position} to {upstream}."
        )));
    }

    let upstream_patches: HashSet<CommitId> = state
        .graph
        .ancestors(&onto)
        .iter()
        .filter_map(|id| state.graph.commit(id))
        .map(|c| c.patch_id(&state.graph).clone())
        .collect();

    let to_replay: Vec<(CommitId, Option<String>)> = state
        .graph
        .unique_ancestors(&head, &onto)
        .into_iter()
        .filter(|c| !c.is_merge() && !upstream_patches.contains(c.patch_id(&state.graph)))
        .map(|c| (c.id.clone(), c.message.clone()))
        .collect();

    let mut tip = onto.clone();
    for (source, message) in &to_replay {
        tip = state.graph.create_derived_commit(
            vec![tip],
            message.clone(),
            Some(CommitOrigin::Rebase(source.clone())),
        )?;
    }

    let (branch_reason, head_reason) = match state.graph.head() {
        Head::Attached(name) => (
            format!("rebase (finish): refs/heads/{name} onto {onto}"),
            format!("rebase (finish): returning to refs/heads/{name}"),
        ),
        Head::Detached(_) => {
            let reason = format!("rebase (finish): {} onto {onto}", short(&head));
            (reason.clone(), reason)
        }
    };
    advance_with(state, &tip, &branch_reason, &head_reason)?;

    Ok(Outcome::changed(format!(
        "Successfully rebased and updated {position} ({} commit{} replayed).",
        to_replay.len(),
        if to_replay.len() == 1 { "" } else { "s" }
    )))
}

fn reset(state: &mut GraphState, spec: &str) -> Result<Outcome, CommandError> {
    let target = state.graph.resolve(spec)?;
    if state.graph.head_commit() == Some(&target) {
        return Ok(Outcome::unchanged(format!(
            "HEAD is now at {} {}",
            short(&target),
            subject(&state.graph, &target)
        )));
    }
    advance(state, &target, &format!("reset: moving to {spec}"))?;
    Ok(Outcome::changed(format!(
        "HEAD is now at {} {}",
        short(&target),
        subject(&state.graph, &target)
    )))
}

fn revert(state: &mut GraphState, spec: &str) -> Result<Outcome, CommandError> {
    let reverted = state.graph.resolve(spec)?;
    let head = head_commit(&state.graph)?;
    let message = format!("undo commit {}", short(&reverted));
    let id = state.graph.create_derived_commit(
        vec![head],
        Some(message.clone()),
        Some(CommitOrigin::Revert(reverted)),
    )?;
    advance(state, &id, &format!("revert: {message}"))?;
    Ok(Outcome::changed(format!(
        "[{} {}] {message}",
        position(&state.graph),
        short(&id)
    )))
}

fn tag(state: &mut GraphState, action: &TagAction) -> Result<Outcome, CommandError> {
    match action {
        TagAction::List => Ok(Outcome::listing(
            state
                .graph
                .refs_of_kind(RefKind::Tag)
                .map(|(name, _)| name.to_string())
                .collect(),
        )),
        TagAction::Create { name, target } => {
            let name = RefName::new(name.as_str())?;
            let spec = target.as_deref().unwrap_or(HEAD);
            let id = state.graph.resolve(spec)?;
            state.graph.create_ref(name.clone(), RefKind::Tag, id.clone())?;
            state
                .reflog
                .append(name.as_str(), None, id.clone(), format!("tag: Created from {spec}"));
            Ok(Outcome::changed(format!("Tagged {} as '{name}'", short(&id))))
        }
        TagAction::Delete { names } => {
            let mut lines = Vec::new();
            for raw in names {
                let name = RefName::new(raw.as_str())?;
                match state.graph.get_ref(&name) {
                    Some(r) if r.kind == RefKind::Tag => {}
                    _ => return Err(GraphError::UnknownReference(raw.clone()).into()),
                }
                let removed = state.graph.delete_ref(&name)?;
                state.reflog.remove(name.as_str());
                lines.push(format!("Deleted tag '{name}' (was {})", short(&removed.target)));
            }
            Ok(Outcome::changed(lines.join("\n")))
        }
    }
}

fn cherry_pick(state: &mut GraphState, revisions: &[String]) -> Result<Outcome, CommandError> {
    let mut lines = Vec::new();
    for spec in revisions {
        let picked = state.graph.resolve(spec)?;
        let head = head_commit(&state.graph)?;
        let commit = state
            .graph
            .commit(&picked)
            .cloned()
            .ok_or_else(|| GraphError::UnknownReference(spec.clone()))?;

        if commit.is_merge() {
            return Err(CommandError::InvalidFlagCombination(format!(
                "commit {} is a merge but no -m option was given",
                short(&picked)
            )));
        }

        let patch = commit.patch_id(&state.graph).clone();
        let already_applied = state.graph.is_ancestor(&picked, &head)
            || state
                .graph
                .ancestors(&head)
                .iter()
                .filter_map(|id| state.graph.commit(id))
                .any(|c| c.patch_id(&state.graph) == &patch);
        if already_applied {
            return Err(CommandError::UncommittedNoOp(format!(
                "commit {} is already applied on HEAD",
                short(&picked)
            )));
        }

        let id = state.graph.create_derived_commit(
            vec![head],
            commit.message.clone(),
            Some(CommitOrigin::CherryPick(picked.clone())),
        )?;
        let text = subject(&state.graph, &id);
        advance(state, &id, &format!("cherry-pick: {text}"))?;
        lines.push(format!("[{} {}] {text}", position(&state.graph), short(&id)));
    }

    let message = lines.join("\n");
    Ok(Outcome::changed(message))
}

fn log(graph: &CommitGraph, spec: &str) -> Result<Outcome, CommandError> {
    let tip = graph.resolve(spec)?;
    let reachable = graph.ancestors(&tip);
    let mut commits: Vec<_> = graph
        .commits()
        .filter(|c| reachable.contains(&c.id))
        .collect();
    commits.reverse();

    let lines = commits
        .into_iter()
        .map(|c| {
            let decoration = decorate(graph, &c.id);
            let message = c.message.as_deref().unwrap_or("");
            let line = if decoration.is_empty() {
                format!("{} {message}", short(&c.id))
            } else {
                format!("{} ({decoration}) {message}", short(&c.id))
            };
            line.trim_end().to_string()
        })
        .collect();
    Ok(Outcome::listing(lines))
}

/// `HEAD -> main, origin/main, tag: v1` style labels for a commit.
pub fn decorate(graph: &CommitGraph, id: &CommitId) -> String {
    let mut labels = Vec::new();
    match graph.head() {
        Head::Detached(at) if at == id => labels.push(HEAD.to_string()),
        _ => {}
    }
    for name in graph.labels_for(id) {
        let Some(r) = graph.get_ref(name) else {
            continue;
        };
        match r.kind {
            RefKind::Branch if graph.current_branch() == Some(name) => {
                labels.insert(0, format!("HEAD -> {name}"))
            }
            RefKind::Tag => labels.push(format!("tag: {name}")),
            _ => labels.push(name.to_string()),
        }
    }
    labels.join(", ")
}
