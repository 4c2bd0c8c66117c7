//! render::draw
//!
//! Turns [`VisualOp`]s into renderer calls for one view.

use crate::core::graph::{Head, RefKind};
use crate::core::layout::Point;

use super::delta::VisualOp;
use super::renderer::{Renderer, Selection};

/// Where and how large one view draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Selector of the view's root element.
    pub root: String,
    pub radius: i32,
}

impl Canvas {
    pub fn new(root: impl Into<String>, radius: i32) -> Self {
        Self {
            root: root.into(),
            radius,
        }
    }

    fn commit(&self, id: &str) -> String {
        format!("{} circle.commit[data-id=\"{}\"]", self.root, id)
    }

    fn links_from(&self, id: &str) -> String {
        format!("{} line.commit-link[data-from=\"{}\"]", self.root, id)
    }

    fn links_to(&self, id: &str) -> String {
        format!("{} line.commit-link[data-to=\"{}\"]", self.root, id)
    }

    fn label(&self, name: &str) -> String {
        format!("{} g.ref-label[data-ref=\"{}\"]", self.root, name)
    }

    fn head(&self) -> String {
        format!("{} g.head-tag", self.root)
    }

    fn label_offset(&self, kind: RefKind) -> i32 {
        match kind {
            RefKind::Branch => -2 * self.radius,
            RefKind::Remote => -3 * self.radius,
            RefKind::Tag => 2 * self.radius,
        }
    }

    fn translate(&self, at: Option<Point>, dy: i32) -> String {
        match at {
            Some(p) => format!("translate({},{})", p.cx, p.cy + dy),
            None => "translate(0,0)".to_string(),
        }
    }
}

fn kind_class(kind: RefKind) -> &'static str {
    match kind {
        RefKind::Branch => "branch",
        RefKind::Tag => "tag",
        RefKind::Remote => "remote-branch",
    }
}

/// Issue the renderer calls for one op.
pub fn apply<R: Renderer>(renderer: &R, canvas: &Canvas, op: &VisualOp) {
    match op {
        VisualOp::Clear => {
            renderer.select(&canvas.root).html("");
            renderer
                .select(&canvas.root)
                .append("g")
                .attr("class", "head-tag")
                .append("text")
                .text("HEAD");
        }
        VisualOp::AddCommit { id, parents, at } => {
            for (parent, from) in parents {
                renderer
                    .select(&canvas.root)
                    .append("line")
                    .attr("class", "commit-link")
                    .attr("data-from", id.as_str())
                    .attr("data-to", parent.as_str())
                    .attr("x1", &at.cx.to_string())
                    .attr("y1", &at.cy.to_string())
                    .attr("x2", &from.cx.to_string())
                    .attr("y2", &from.cy.to_string());
            }
            renderer
                .select(&canvas.root)
                .append("circle")
                .attr("class", "commit")
                .attr("data-id", id.as_str())
                .attr("cx", &at.cx.to_string())
                .attr("cy", &at.cy.to_string())
                .attr("r", &canvas.radius.to_string());
        }
        VisualOp::MoveCommit { id, to } => {
            let (cx, cy) = (to.cx.to_string(), to.cy.to_string());
            renderer
                .select(&canvas.commit(id.as_str()))
                .attr("cx", &cx)
                .attr("cy", &cy);
            renderer
                .select_all(&canvas.links_from(id.as_str()))
                .attr("x1", &cx)
                .attr("y1", &cy);
            renderer
                .select_all(&canvas.links_to(id.as_str()))
                .attr("x2", &cx)
                .attr("y2", &cy);
        }
        VisualOp::AddRef {
            name,
            kind,
            target,
            at,
        } => {
            renderer
                .select(&canvas.root)
                .append("g")
                .attr("class", "ref-label")
                .classed(kind_class(*kind), true)
                .attr("data-ref", name.as_str())
                .attr("data-target", target.as_str())
                .attr("transform", &canvas.translate(*at, canvas.label_offset(*kind)))
                .append("text")
                .text(name.as_str());
        }
        VisualOp::MoveRef {
            name, kind, to, at, ..
        } => {
            renderer
                .select(&canvas.label(name.as_str()))
                .attr("data-target", to.as_str())
                .attr("transform", &canvas.translate(*at, canvas.label_offset(*kind)));
        }
        VisualOp::RemoveRef { name } => {
            renderer.select(&canvas.label(name.as_str())).remove();
        }
        VisualOp::MoveHead { head, target, at } => {
            let selection = renderer
                .select(&canvas.head())
                .classed("detached", head.is_detached())
                .attr("transform", &canvas.translate(*at, -4 * canvas.radius));
            let selection = match target {
                Some(id) => selection.attr("data-target", id.as_str()),
                None => selection.attr("data-target", ""),
            };
            let label = match head {
                Head::Attached(name) => format!("HEAD &rarr; {name}"),
                Head::Detached(_) => "HEAD".to_string(),
            };
            selection.html(&label);
        }
        VisualOp::RemoveCommit { id } => {
            renderer.select_all(&canvas.links_from(id.as_str())).remove();
            renderer.select(&canvas.commit(id.as_str())).remove();
        }
    }
}
