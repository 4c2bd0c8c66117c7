//! render::sync
//!
//! Keeps each view's drawing in step with its model state.
//!
//! # Flow
//!
//! ```text
//! GraphState ──Projection::of──> diff(shown, new) ──> RenderQueue ──pump──> Renderer
//! ```
//!
//! `sync` diffs against what was last queued for the view, not what is on
//! screen, so batches queued behind an animation still compose correctly.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::state::GraphState;

use super::delta::{self, VisualOp};
use super::draw::{self, Canvas};
use super::projection::Projection;
use super::queue::{Batch, RenderQueue};
use super::renderer::Renderer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no view named '{0}' is attached")]
    UnknownView(String),
}

#[derive(Debug)]
struct ViewSlot {
    canvas: Canvas,
    shown: Projection,
}

/// Per-view delta computation plus the shared draw queue.
#[derive(Debug, Default)]
pub struct RenderSync {
    views: BTreeMap<String, ViewSlot>,
    queue: RenderQueue,
}

impl RenderSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a view. Its picture starts empty.
    pub fn attach(&mut self, view: impl Into<String>, canvas: Canvas) {
        self.views.insert(
            view.into(),
            ViewSlot {
                canvas,
                shown: Projection::empty(),
            },
        );
    }

    /// Stop tracking a view and drop its queued batches.
    pub fn detach(&mut self, view: &str) {
        self.views.remove(view);
        self.queue.purge(view);
    }

    /// Forget all views and queued work.
    pub fn clear(&mut self) {
        self.views.clear();
        self.queue.clear();
    }

    pub fn views(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// The picture the queued work leads to.
    pub fn shown(&self, view: &str) -> Option<&Projection> {
        self.views.get(view).map(|slot| &slot.shown)
    }

    /// Queue the ops that bring `view` to `state`. Returns how many ops were
    /// queued.
    pub fn sync(&mut self, view: &str, state: &GraphState) -> Result<usize, RenderError> {
        self.update(view, state, |shown, next| delta::diff(shown, next))
    }

    /// Queue a clear-and-redraw of `view`.
    pub fn full(&mut self, view: &str, state: &GraphState) -> Result<usize, RenderError> {
        self.update(view, state, |_, next| delta::full(next))
    }

    fn update(
        &mut self,
        view: &str,
        state: &GraphState,
        ops_for: impl FnOnce(&Projection, &Projection) -> Vec<VisualOp>,
    ) -> Result<usize, RenderError> {
        let slot = self
            .views
            .get_mut(view)
            .ok_or_else(|| RenderError::UnknownView(view.to_string()))?;

        let next = Projection::of(state);
        let ops = ops_for(&slot.shown, &next);
        let count = ops.len();
        slot.shown = next;
        self.queue.enqueue(Batch {
            view: view.to_string(),
            ops,
        });
        Ok(count)
    }

    /// Draw the next batch if nothing is animating. Returns whether a batch
    /// was drawn.
    pub fn pump<R: Renderer>(&mut self, renderer: &R) -> bool {
        let Some(batch) = self.queue.next_ready() else {
            return false;
        };
        match self.views.get(&batch.view) {
            Some(slot) => {
                for op in &batch.ops {
                    draw::apply(renderer, &slot.canvas, op);
                }
            }
            None => self.queue.finish(),
        }
        true
    }

    /// The renderer finished animating the batch in flight.
    pub fn animation_finished(&mut self) {
        self.queue.finish();
    }

    /// Draw everything queued without waiting for animations. Returns the
    /// number of batches drawn.
    pub fn drain<R: Renderer>(&mut self, renderer: &R) -> usize {
        let mut drawn = 0;
        self.queue.finish();
        while self.pump(renderer) {
            self.queue.finish();
            drawn += 1;
        }
        drawn
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }
}
