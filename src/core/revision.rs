//! core::revision
//!
//! Parsing of revision expressions such as `HEAD~2`, `main^2` or `e137^`.
//!
//! Only the syntax is handled here; [`CommitGraph::resolve`] walks the graph.
//!
//! [`CommitGraph::resolve`]: super::graph::CommitGraph::resolve

/// One navigation step after the base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `~N`: follow first parents N times.
    Ancestor(usize),
    /// `^N`: take the N-th parent (`^0` is the commit itself).
    Parent(usize),
}

/// A parsed revision: a base name plus navigation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision<'a> {
    pub base: &'a str,
    pub steps: Vec<Step>,
}

impl<'a> Revision<'a> {
    /// Parse a revision expression. Returns `None` on malformed input.
    ///
    /// # Example
    ///
    /// ```
    /// use gitsketch::core::revision::{Revision, Step};
    ///
    /// let rev = Revision::parse("HEAD~2^2").unwrap();
    /// assert_eq!(rev.base, "HEAD");
    /// assert_eq!(rev.steps, vec![Step::Ancestor(2), Step::Parent(2)]);
    /// ```
    pub fn parse(spec: &'a str) -> Option<Self> {
        let split = spec.find(['~', '^']).unwrap_or(spec.len());
        let (base, mut rest) = spec.split_at(split);
        if base.is_empty() {
            return None;
        }

        let mut steps = Vec::new();
        while let Some(op) = rest.chars().next() {
            rest = &rest[op.len_utf8()..];
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let count = if digits == 0 {
                1
            } else {
                rest[..digits].parse().ok()?
            };
            rest = &rest[digits..];

            steps.push(match op {
                '~' => Step::Ancestor(count),
                '^' => Step::Parent(count),
                _ => return None,
            });
        }

        Some(Self { base, steps })
    }
}
