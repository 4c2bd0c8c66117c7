//! engine::remote
//!
//! `fetch`, `push` and `pull` against the simulated origin.
//!
//! The origin is a second [`GraphState`] held in memory. Commits move
//! between the two graphs with their ids intact, so a commit looks the same
//! on both sides. Nothing here touches a network.
//!
//! # Tracking refs
//!
//! The local graph mirrors each origin branch `b` as a remote-tracking ref
//! `<remote>/b`. Only fetch and push move them.

use std::collections::HashSet;

use super::command::{CommandError, Outcome};
use super::interpreter::{merge, short, Workspace};
use crate::core::graph::{CommitGraph, GraphError, RefKind};
use crate::core::reflog::HEAD;
use crate::core::state::GraphState;
use crate::core::types::{CommitId, RefName};

/// Copy every commit reachable from `tips` in `from` that `to` lacks.
///
/// Commits are inserted in `from`'s insertion order, so parents always
/// land first. Returns how many were copied.
fn copy_missing(
    from: &CommitGraph,
    to: &mut CommitGraph,
    tips: &[CommitId],
) -> Result<usize, CommandError> {
    let mut wanted = HashSet::new();
    for tip in tips {
        wanted.extend(from.ancestors(tip));
    }

    let mut copied = 0;
    for commit in from.commits() {
        if !wanted.contains(&commit.id) || to.contains(&commit.id) {
            continue;
        }
        to.insert_commit(
            commit.id.clone(),
            commit.parents.clone(),
            commit.message.clone(),
            commit.origin.clone(),
        )?;
        copied += 1;
    }
    Ok(copied)
}

fn remote_name(local: &GraphState) -> Result<String, CommandError> {
    local
        .meta
        .remote_name
        .clone()
        .ok_or(CommandError::NoRemote)
}

/// Point the tracking ref at `target`, creating it if needed.
///
/// Returns the previous target.
fn update_tracking(
    local: &mut GraphState,
    tracking: &RefName,
    target: &CommitId,
    reason: impl Into<String>,
) -> Result<Option<CommitId>, CommandError> {
    let previous = match local.graph.get_ref(tracking) {
        Some(r) => {
            let previous = r.target.clone();
            local.graph.move_ref(tracking, target.clone())?;
            Some(previous)
        }
        None => {
            local
                .graph
                .create_ref(tracking.clone(), RefKind::Remote, target.clone())?;
            None
        }
    };
    local
        .reflog
        .append(tracking.as_str(), previous.clone(), target.clone(), reason);
    Ok(previous)
}

/// Copy origin's branches into the local graph as tracking refs.
pub fn fetch(ws: &mut Workspace) -> Result<Outcome, CommandError> {
    let remote = remote_name(&ws.local)?;
    let origin = ws.origin.as_ref().ok_or(CommandError::NoRemote)?;
    let local = &mut ws.local;

    let branches: Vec<(RefName, CommitId)> = origin
        .graph
        .refs_of_kind(RefKind::Branch)
        .map(|(name, target)| (name.clone(), target.clone()))
        .collect();
    let tips: Vec<CommitId> = branches.iter().map(|(_, tip)| tip.clone()).collect();
    let copied = copy_missing(&origin.graph, &mut local.graph, &tips)?;

    let mut lines = Vec::new();
    for (branch, tip) in &branches {
        let tracking = RefName::remote_tracking(&remote, branch)?;
        let current = local.graph.get_ref(&tracking).map(|r| r.target.clone());
        match current {
            Some(ref previous) if previous == tip => continue,
            Some(previous) => {
                let forced = !local.graph.is_ancestor(&previous, tip);
                let reason = if forced {
                    "fetch: forced-update"
                } else {
                    "fetch: fast-forward"
                };
                update_tracking(local, &tracking, tip, reason)?;
                let arrow = if forced { "..." } else { ".." };
                lines.push(format!(
                    "   {}{arrow}{}  {branch} -> {tracking}",
                    short(&previous),
                    short(tip)
                ));
            }
            None => {
                update_tracking(local, &tracking, tip, "fetch: storing head")?;
                lines.push(format!(" * [new branch]      {branch} -> {tracking}"));
            }
        }
    }

    // A fresh local graph picks up its current branch from the remote.
    if local.graph.head_commit().is_none() {
        if let Some(branch) = local.graph.current_branch().cloned() {
            let tracking = RefName::remote_tracking(&remote, &branch)?;
            if let Some(tip) = local.graph.get_ref(&tracking).map(|r| r.target.clone()) {
                local.graph.move_ref(&branch, tip.clone())?;
                let reason = format!("branch: Created from {tracking}");
                local.reflog.append(branch.as_str(), None, tip.clone(), reason.clone());
                local.reflog.append(HEAD, None, tip, reason);
            }
        }
    }

    if lines.is_empty() && copied == 0 {
        return Ok(Outcome::unchanged("Already up to date."));
    }
    Ok(Outcome::changed(format!("From {remote}")).with_lines(lines))
}

/// Send a local branch to origin.
///
/// Only fast-forwards are accepted unless `force` is set.
pub fn push(
    ws: &mut Workspace,
    remote_arg: Option<&str>,
    branch_arg: Option<&str>,
    force: bool,
) -> Result<Outcome, CommandError> {
    let remote = remote_name(&ws.local)?;
    if let Some(requested) = remote_arg {
        if requested != remote {
            return Err(CommandError::UnknownRemote(requested.to_string()));
        }
    }
    let Some(origin) = ws.origin.as_mut() else {
        return Err(CommandError::NoRemote);
    };
    let local = &mut ws.local;

    let branch = match branch_arg {
        Some(name) => RefName::new(name)?,
        None => local
            .graph
            .current_branch()
            .cloned()
            .ok_or_else(|| CommandError::MissingArgument {
                command: "push".into(),
                what: "a branch to push (HEAD is detached)".into(),
            })?,
    };
    let tip = local
        .graph
        .branch_tip(&branch)
        .cloned()
        .ok_or_else(|| GraphError::UnknownReference(branch.to_string()))?;

    let remote_tip = origin.graph.branch_tip(&branch).cloned();
    if remote_tip.as_ref() == Some(&tip) {
        return Ok(Outcome::unchanged("Everything up-to-date"));
    }
    let forced = match &remote_tip {
        Some(theirs) => !local.graph.contains(theirs) || !local.graph.is_ancestor(theirs, &tip),
        None => false,
    };
    if forced && !force {
        return Err(CommandError::PushRejected(branch));
    }

    copy_missing(&local.graph, &mut origin.graph, std::slice::from_ref(&tip))?;

    let unborn_head = origin.graph.head_commit().is_none();
    let previous = origin.graph.move_ref(&branch, tip.clone())?;
    origin
        .reflog
        .append(branch.as_str(), previous.clone(), tip.clone(), "push");
    if unborn_head && origin.graph.current_branch() != Some(&branch) {
        origin.graph.attach_head(branch.clone());
    }
    if origin.graph.current_branch() == Some(&branch) {
        origin.reflog.append(HEAD, previous.clone(), tip.clone(), "push");
    }

    let tracking = RefName::remote_tracking(&remote, &branch)?;
    update_tracking(local, &tracking, &tip, "update by push")?;

    let line = match (&previous, forced) {
        (None, _) => format!(" * [new branch]      {branch} -> {branch}"),
        (Some(old), true) => format!(
            " + {}...{} {branch} -> {branch} (forced update)",
            short(old),
            short(&tip)
        ),
        (Some(old), false) => format!("   {}..{}  {branch} -> {branch}", short(old), short(&tip)),
    };
    Ok(Outcome::changed(format!("To {remote}")).with_lines(vec![line]))
}

/// Fetch, then merge the current branch's tracking ref.
pub fn pull(ws: &mut Workspace) -> Result<Outcome, CommandError> {
    let fetched = fetch(ws)?;

    let remote = remote_name(&ws.local)?;
    let local = &mut ws.local;
    let branch = local
        .graph
        .current_branch()
        .cloned()
        .ok_or_else(|| CommandError::MissingArgument {
            command: "pull".into(),
            what: "a branch to merge into (HEAD is detached)".into(),
        })?;
    let tracking = RefName::remote_tracking(&remote, &branch)?;

    let merged = merge(
        local,
        tracking.as_str(),
        false,
        Some(format!("Merge branch '{branch}' of {remote}")),
        "pull",
    )?;

    let mut lines = fetched.lines;
    lines.push(merged.message.clone());
    Ok(Outcome {
        changed: fetched.changed || merged.changed,
        lines,
        ..merged
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::Head;
    use crate::core::layout::Dimensions;
    use crate::engine::command::CommandOutput;
    use crate::engine::interpreter::Interpreter;

    fn name(s: &str) -> RefName {
        RefName::new(s).unwrap()
    }

    fn interpreter() -> Interpreter {
        let local = GraphState::new(
            "local",
            name("main"),
            Dimensions::default(),
            Some("origin".into()),
        );
        let origin = GraphState::new("local-Origin", name("main"), Dimensions::default(), None);
        Interpreter::new(Workspace::new(local, Some(origin)))
    }

    fn run(i: &mut Interpreter, line: &str) -> Outcome {
        match i.run_line(line) {
            CommandOutput::Success(outcome) => outcome,
            CommandOutput::Failed { error } => panic!("'{line}' failed: {error}"),
        }
    }

    fn origin(i: &Interpreter) -> &GraphState {
        i.workspace().origin.as_ref().unwrap()
    }

    fn local(i: &Interpreter) -> &GraphState {
        &i.workspace().local
    }

    #[test]
    fn push_copies_commits_and_tracks() {
        let mut i = interpreter();
        run(&mut i, "commit -m one");
        run(&mut i, "commit -m two");
        run(&mut i, "push");

        let tip = local(&i).graph.head_commit().cloned().unwrap();
        assert_eq!(origin(&i).graph.branch_tip(&name("main")), Some(&tip));
        assert_eq!(origin(&i).graph.len(), 2);
        assert_eq!(origin(&i).graph.head(), &Head::Attached(name("main")));
        assert_eq!(
            local(&i).graph.get_ref(&name("origin/main")).map(|r| r.kind),
            Some(RefKind::Remote)
        );
        assert_eq!(
            local(&i).reflog.entries_for("origin/main")[0].reason,
            "update by push"
        );
    }

    #[test]
    fn push_twice_is_up_to_date() {
        let mut i = interpreter();
        run(&mut i, "commit");
        run(&mut i, "push");
        let outcome = run(&mut i, "push origin main");
        assert!(!outcome.changed);
    }

    #[test]
    fn unknown_remote_is_rejected() {
        let mut i = interpreter();
        run(&mut i, "commit");
        let out = i.run_line("push upstream main");
        assert_eq!(
            out.into_result().unwrap_err(),
            "'upstream' does not appear to be a remote"
        );
    }

    #[test]
    fn non_fast_forward_needs_force() {
        let mut i = interpreter();
        run(&mut i, "commit");
        run(&mut i, "commit");
        run(&mut i, "push");
        run(&mut i, "reset HEAD~1");
        run(&mut i, "commit -m diverged");
        assert!(i.run_line("push").is_failed());
        run(&mut i, "push -f");
        let tip = local(&i).graph.head_commit().cloned().unwrap();
        assert_eq!(origin(&i).graph.branch_tip(&name("main")), Some(&tip));
    }

    #[test]
    fn fetch_and_pull_bring_remote_work() {
        let mut i = interpreter();
        run(&mut i, "commit -m base");
        run(&mut i, "push");

        // Someone else pushes to origin.
        let mut ws = i.workspace().clone();
        let origin = ws.origin.as_mut().unwrap();
        let base = origin.graph.branch_tip(&name("main")).cloned().unwrap();
        let theirs = origin.graph.create_commit(vec![base], Some("theirs".into())).unwrap();
        origin.graph.move_ref(&name("main"), theirs.clone()).unwrap();
        i.replace(ws);

        let fetched = run(&mut i, "fetch");
        assert!(fetched.changed);
        assert_eq!(
            local(&i).graph.get_ref(&name("origin/main")).unwrap().target,
            theirs
        );
        assert_ne!(local(&i).graph.head_commit(), Some(&theirs));

        run(&mut i, "pull");
        assert_eq!(local(&i).graph.head_commit(), Some(&theirs));
    }

    #[test]
    fn fetch_into_empty_graph_creates_current_branch() {
        let mut i = interpreter();
        let mut ws = i.workspace().clone();
        let origin = ws.origin.as_mut().unwrap();
        let root = origin.graph.create_commit(vec![], None).unwrap();
        origin.graph.move_ref(&name("main"), root.clone()).unwrap();
        i.replace(ws);

        run(&mut i, "fetch");
        assert_eq!(local(&i).graph.branch_tip(&name("main")), Some(&root));
    }

    #[test]
    fn checkout_of_remote_branch_creates_tracking_branch() {
        let mut i = interpreter();
        run(&mut i, "commit");
        run(&mut i, "checkout -b topic");
        run(&mut i, "commit");
        run(&mut i, "push");
        run(&mut i, "checkout main");
        run(&mut i, "branch -D topic");

        run(&mut i, "checkout topic");
        assert_eq!(local(&i).graph.head(), &Head::Attached(name("topic")));
        assert_eq!(
            local(&i).reflog.entries_for("topic")[0].reason,
            "branch: Created from origin/topic"
        );
    }

    #[test]
    fn branch_named_like_tracking_ref_is_rejected() {
        let mut i = interpreter();
        run(&mut i, "commit");
        assert!(i.run_line("branch origin/main").is_failed());
    }
}
