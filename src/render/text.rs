//! render::text
//!
//! Plain-text drawing of a view for terminals.
//!
//! One row per visible commit, newest first. Each layout lane gets a column;
//! `*` marks the commit's lane and `|` marks lanes that pass through the row.
//!
//! ```text
//! * 9c1e2f4 (HEAD -> main) Merge branch 'topic'
//! | * 51d0a3b (topic) Side work
//! * | 0b7c9e2 Main work
//! * | 4e88aa1 Initial commit
//! ```

use std::collections::BTreeSet;

use crate::core::state::GraphState;
use crate::engine::interpreter::{decorate, SHORT_ID};

use super::projection::Projection;

/// Draw `state` as text.
pub fn draw_text(state: &GraphState) -> String {
    let projection = Projection::of(state);
    let graph = &state.graph;

    let mut out = format!("[{}] HEAD: {}\n", state.meta.name, graph.head().describe());
    if projection.is_empty() {
        out.push_str("(no commits)\n");
        return out;
    }

    let commits = projection.commits();
    let lanes: Vec<i32> = commits
        .iter()
        .map(|c| c.point.cy)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Span of rows (by seq) each lane covers, including the link down to the
    // first parent of its oldest commit.
    let spans: Vec<(usize, usize)> = lanes
        .iter()
        .map(|lane| {
            let mut top = 0;
            let mut bottom = usize::MAX;
            for c in commits.iter().filter(|c| c.point.cy == *lane) {
                top = top.max(c.seq);
                let reach = c
                    .parents
                    .first()
                    .and_then(|p| projection.commit(p))
                    .map_or(c.seq, |p| p.seq);
                bottom = bottom.min(reach);
            }
            (bottom, top)
        })
        .collect();

    for commit in commits.iter().rev() {
        let mut row = String::new();
        for (lane, (bottom, top)) in lanes.iter().zip(&spans) {
            let mark = if *lane == commit.point.cy {
                '*'
            } else if *bottom < commit.seq && commit.seq < *top {
                '|'
            } else {
                ' '
            };
            row.push(mark);
            row.push(' ');
        }

        let labels = decorate(graph, &commit.id);
        let message = graph
            .commit(&commit.id)
            .and_then(|c| c.message.clone())
            .unwrap_or_default();

        out.push_str(row.trim_end());
        out.push(' ');
        out.push_str(commit.id.short(SHORT_ID));
        if !labels.is_empty() {
            out.push_str(&format!(" ({labels})"));
        }
        if !message.is_empty() {
            out.push(' ');
            out.push_str(&message);
        }
        out.push('\n');
    }

    out
}
