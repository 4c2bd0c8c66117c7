//! Property-based tests for the commit graph, relabeling, snapshots and
//! the undo history.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated command sequences and inputs.

use proptest::prelude::*;

use gitsketch::core::graph::CommitGraph;
use gitsketch::core::history::{HistoryEntry, UndoHistory};
use gitsketch::core::layout::Dimensions;
use gitsketch::core::naming::Relabel;
use gitsketch::core::snapshot::SnapshotCodec;
use gitsketch::core::state::GraphState;
use gitsketch::core::types::RefName;
use gitsketch::core::verify::fast_verify;
use gitsketch::engine::{Interpreter, Workspace};

fn main_branch() -> RefName {
    RefName::new("main").unwrap()
}

/// Strategy for one command line drawn from a small vocabulary.
///
/// Branch names come from a fixed pool so commands collide with each other
/// often enough to exercise merges, rebases and failures.
fn command_line() -> impl Strategy<Value = String> {
    let branch = prop::sample::select(vec!["main", "topic", "fix", "v1"]);
    let spec = prop::sample::select(vec!["HEAD", "HEAD~1", "HEAD^", "main", "topic", "fix"]);
    prop_oneof![
        4 => Just("commit".to_string()),
        1 => Just("commit --amend".to_string()),
        2 => branch.clone().prop_map(|b| format!("branch {b}")),
        2 => branch.clone().prop_map(|b| format!("checkout {b}")),
        2 => branch.clone().prop_map(|b| format!("checkout -b {b}")),
        1 => branch.clone().prop_map(|b| format!("switch -c {b}")),
        2 => branch.clone().prop_map(|b| format!("merge {b}")),
        1 => branch.clone().prop_map(|b| format!("rebase {b}")),
        1 => spec.clone().prop_map(|s| format!("reset {s}")),
        1 => spec.clone().prop_map(|s| format!("revert {s}")),
        1 => spec.clone().prop_map(|s| format!("cherry-pick {s}")),
        1 => spec.prop_map(|s| format!("checkout {s}")),
        1 => branch.clone().prop_map(|b| format!("tag {b}")),
        1 => branch.prop_map(|b| format!("branch -D {b}")),
    ]
}

/// Run every line, ignoring failures, and return the final state.
fn run_all(lines: &[String]) -> GraphState {
    let local = GraphState::new("prop", main_branch(), Dimensions::default(), None);
    let mut interpreter = Interpreter::new(Workspace::new(local, None));
    for line in lines {
        let _ = interpreter.run_line(line);
    }
    interpreter.into_workspace().local
}

// =============================================================================
// Graph
// =============================================================================

proptest! {
    #[test]
    fn commit_chains_are_ancestors(len in 1usize..30) {
        let mut graph = CommitGraph::new("chain", main_branch());
        let mut ids = Vec::new();
        for _ in 0..len {
            let parents = ids.last().cloned().into_iter().collect();
            ids.push(graph.create_commit(parents, None).unwrap());
        }

        for (i, older) in ids.iter().enumerate() {
            prop_assert!(graph.is_ancestor(older, older));
            for newer in &ids[i..] {
                prop_assert!(graph.is_ancestor(older, newer));
            }
            for newer in &ids[i + 1..] {
                prop_assert!(!graph.is_ancestor(newer, older));
            }
        }
    }

    #[test]
    fn command_sequences_keep_the_graph_valid(
        lines in prop::collection::vec(command_line(), 0..40)
    ) {
        let state = run_all(&lines);

        prop_assert!(fast_verify(&state.graph).into_result().is_ok());
        for commit in state.graph.commits() {
            prop_assert!(state.layout.position(&commit.id).is_some());
        }
        if !state.graph.is_empty() {
            prop_assert!(state.graph.head_commit().is_some());
        }
    }

    #[test]
    fn failed_commands_change_nothing(
        lines in prop::collection::vec(command_line(), 1..30)
    ) {
        let local = GraphState::new("prop", main_branch(), Dimensions::default(), None);
        let mut interpreter = Interpreter::new(Workspace::new(local, None));
        for line in &lines {
            let before = interpreter.workspace().clone();
            let output = interpreter.run_line(line);
            if output.is_failed() {
                prop_assert_eq!(interpreter.workspace(), &before);
            }
        }
    }

    #[test]
    fn ids_are_deterministic(lines in prop::collection::vec(command_line(), 0..25)) {
        prop_assert_eq!(run_all(&lines), run_all(&lines));
    }
}

// =============================================================================
// Relabeling
// =============================================================================

/// Strategy for reflog-style reason text mentioning a few labels.
fn reason_text() -> impl Strategy<Value = String> {
    let word = prop::sample::select(vec![
        "checkout:", "moving", "from", "to", "master", "main", "origin/master",
        "master~1", "master-old", "'master'.", "refs/heads/master", "topic",
    ]);
    prop::collection::vec(word, 0..10).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn relabeling_text_is_idempotent(text in reason_text()) {
        let relabel = Relabel::new("master", "main").with_remote("origin");
        let once = relabel.text(&text);
        let twice = relabel.text(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn relabeled_text_has_no_bare_old_label(text in reason_text()) {
        let relabel = Relabel::new("master", "main").with_remote("origin");
        let out = relabel.text(&text);
        for word in out.split(' ') {
            prop_assert_ne!(word, "master");
            prop_assert_ne!(word, "origin/master");
        }
    }

    #[test]
    fn renaming_the_default_branch_twice_is_a_noop(
        lines in prop::collection::vec(command_line(), 0..20)
    ) {
        let mut state = run_all(&lines);
        let to = RefName::new("trunk").unwrap();
        if state.rename_default_branch(&to).is_ok() {
            let once = state.clone();
            prop_assert!(state.rename_default_branch(&to).is_ok());
            prop_assert_eq!(state, once);
        }
    }
}

// =============================================================================
// Snapshots and history
// =============================================================================

proptest! {
    #[test]
    fn snapshots_restore_equal_states(
        lines in prop::collection::vec(command_line(), 0..30)
    ) {
        let state = run_all(&lines);
        let codec = SnapshotCodec::new(main_branch(), "origin");

        let token = codec.serialize(&state).unwrap();
        let restored = codec.deserialize(&token).unwrap();

        prop_assert_eq!(restored, state);
    }

    #[test]
    fn push_after_undo_truncates(pushes in 1usize..10, undos in 0usize..10) {
        let entry = |n: usize| HistoryEntry::new(format!("{{\"n\":{n}}}"), None);
        let mut history = UndoHistory::new(entry(0));
        for n in 1..=pushes {
            history.push(entry(n));
        }
        let undone = undos.min(pushes);
        for _ in 0..undos {
            history.undo();
        }
        prop_assert_eq!(history.pointer(), pushes - undone);

        history.push(entry(99));

        prop_assert_eq!(history.len(), pushes - undone + 2);
        prop_assert_eq!(history.pointer(), history.len() - 1);
        prop_assert!(!history.can_redo());
        prop_assert_eq!(&history.current().hv, "{\"n\":99}");
    }

    #[test]
    fn history_json_round_trips(pushes in 0usize..8, undos in 0usize..8) {
        let mut history = UndoHistory::new(HistoryEntry::new("{}".into(), None));
        for n in 0..pushes {
            history.push(HistoryEntry::new(format!("{{\"n\":{n}}}"), Some("{}".into())));
        }
        for _ in 0..undos {
            history.undo();
        }

        let json = history.to_json().unwrap();
        prop_assert_eq!(UndoHistory::from_json(&json).unwrap(), history);
    }
}
