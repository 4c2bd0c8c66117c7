//! core::layout
//!
//! Layout hints: where each commit is drawn.
//!
//! Positions are assigned once, when a commit first appears, and then stay
//! put so that the picture does not jump around between commands. They are
//! saved in snapshots together with the graph.
//!
//! # Placement
//!
//! - A root commit starts at the left margin on the middle lane
//! - A child sits one column right of its parent, on the parent's lane
//! - A merge sits one column right of its rightmost parent, on the first
//!   parent's lane
//! - If that slot is taken, the commit moves down one lane at a time until
//!   it finds a free slot

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::graph::CommitGraph;
use super::types::CommitId;

/// Canvas dimensions for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
    pub commit_radius: i32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 883,
            height: 400,
            commit_radius: 15,
        }
    }
}

impl Dimensions {
    /// Horizontal distance between a commit and its child.
    pub fn column_spacing(&self) -> i32 {
        self.commit_radius * 4
    }

    /// Vertical distance between lanes.
    pub fn lane_spacing(&self) -> i32 {
        self.commit_radius * 3
    }

    fn origin(&self) -> Point {
        Point {
            cx: self.commit_radius * 2,
            cy: self.height / 2,
        }
    }
}

/// Center of a commit circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub cx: i32,
    pub cy: i32,
}

/// Positions of all placed commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    dimensions: Dimensions,
    positions: HashMap<CommitId, Point>,
}

impl Layout {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            positions: HashMap::new(),
        }
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn position(&self, id: &CommitId) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Pin a commit to a point (restored state or caller-chosen layout).
    pub fn set(&mut self, id: CommitId, point: Point) {
        self.positions.insert(id, point);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Place every commit of `graph` that has no position yet, in insertion
    /// order so parents are always placed before their children.
    ///
    /// Returns the ids that were placed.
    pub fn place_missing(&mut self, graph: &CommitGraph) -> Vec<CommitId> {
        let mut occupied: HashSet<Point> = self.positions.values().copied().collect();
        let mut placed = Vec::new();

        for commit in graph.commits() {
            if self.positions.contains_key(&commit.id) {
                continue;
            }

            let parent_points: Vec<Point> = commit
                .parents
                .iter()
                .filter_map(|p| self.positions.get(p).copied())
                .collect();

            let preferred = match parent_points.as_slice() {
                [] => self.dimensions.origin(),
                [first, ..] => Point {
                    cx: parent_points.iter().map(|p| p.cx).max().unwrap_or(first.cx)
                        + self.dimensions.column_spacing(),
                    cy: first.cy,
                },
            };

            let mut point = preferred;
            while occupied.contains(&point) {
                point.cy += self.dimensions.lane_spacing();
            }

            occupied.insert(point);
            self.positions.insert(commit.id.clone(), point);
            placed.push(commit.id.clone());
        }

        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RefName;

    fn graph() -> CommitGraph {
        CommitGraph::new("layout", RefName::new("main").unwrap())
    }

    #[test]
    fn chain_moves_right_on_one_lane() {
        let mut g = graph();
        let a = g.create_commit(vec![], None).unwrap();
        let b = g.create_commit(vec![a.clone()], None).unwrap();

        let mut layout = Layout::new(Dimensions::default());
        let placed = layout.place_missing(&g);
        assert_eq!(placed, vec![a.clone(), b.clone()]);

        let pa = layout.position(&a).unwrap();
        let pb = layout.position(&b).unwrap();
        assert_eq!(pb.cx - pa.cx, Dimensions::default().column_spacing());
        assert_eq!(pa.cy, pb.cy);
    }

    #[test]
    fn sibling_takes_next_lane() {
        let mut g = graph();
        let a = g.create_commit(vec![], None).unwrap();
        let b = g.create_commit(vec![a.clone()], None).unwrap();
        let c = g.create_commit(vec![a.clone()], None).unwrap();

        let mut layout = Layout::new(Dimensions::default());
        layout.place_missing(&g);
        let pb = layout.position(&b).unwrap();
        let pc = layout.position(&c).unwrap();
        assert_eq!(pb.cx, pc.cx);
        assert_eq!(pc.cy - pb.cy, Dimensions::default().lane_spacing());
    }

    #[test]
    fn merge_sits_right_of_both_parents() {
        let mut g = graph();
        let a = g.create_commit(vec![], None).unwrap();
        let b = g.create_commit(vec![a.clone()], None).unwrap();
        let side = g.create_commit(vec![a.clone()], None).unwrap();
        let side2 = g.create_commit(vec![side.clone()], None).unwrap();
        let merge = g.create_commit(vec![b.clone(), side2.clone()], None).unwrap();

        let mut layout = Layout::new(Dimensions::default());
        layout.place_missing(&g);
        let pm = layout.position(&merge).unwrap();
        let pb = layout.position(&b).unwrap();
        let ps = layout.position(&side2).unwrap();
        assert_eq!(pm.cx, ps.cx + Dimensions::default().column_spacing());
        assert_eq!(pm.cy, pb.cy);
    }

    #[test]
    fn existing_positions_are_kept() {
        let mut g = graph();
        let a = g.create_commit(vec![], None).unwrap();
        let mut layout = Layout::new(Dimensions::default());
        layout.set(a.clone(), Point { cx: 7, cy: 9 });
        assert!(layout.place_missing(&g).is_empty());
        assert_eq!(layout.position(&a), Some(Point { cx: 7, cy: 9 }));
    }
}
