//! render::queue
//!
//! FIFO of op batches waiting to be drawn.
//!
//! One batch is in flight at a time. The model may run several commands
//! ahead of the animation; their batches wait here in order and nothing is
//! merged or skipped.

use std::collections::VecDeque;

use super::delta::VisualOp;

/// Ops produced by one model change for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub view: String,
    pub ops: Vec<VisualOp>,
}

#[derive(Debug, Default)]
pub struct RenderQueue {
    pending: VecDeque<Batch>,
    in_flight: bool,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch. Empty batches are not queued.
    pub fn enqueue(&mut self, batch: Batch) {
        if !batch.ops.is_empty() {
            self.pending.push_back(batch);
        }
    }

    /// Next batch to draw, unless one is still animating.
    pub fn next_ready(&mut self) -> Option<Batch> {
        if self.in_flight {
            return None;
        }
        let batch = self.pending.pop_front()?;
        self.in_flight = true;
        Some(batch)
    }

    /// The batch in flight finished animating.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Nothing pending and nothing animating.
    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.pending.is_empty()
    }

    /// Drop batches of a view that is being torn down.
    pub fn purge(&mut self, view: &str) {
        self.pending.retain(|b| b.view != view);
    }

    /// Drop everything (teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(view: &str) -> Batch {
        Batch {
            view: view.into(),
            ops: vec![VisualOp::Clear],
        }
    }

    #[test]
    fn one_batch_in_flight_at_a_time() {
        let mut queue = RenderQueue::new();
        queue.enqueue(batch("a"));
        queue.enqueue(batch("b"));

        assert_eq!(queue.next_ready().map(|b| b.view), Some("a".into()));
        assert!(queue.next_ready().is_none());

        queue.finish();
        assert_eq!(queue.next_ready().map(|b| b.view), Some("b".into()));
        queue.finish();
        assert!(queue.is_idle());
    }

    #[test]
    fn empty_batches_are_skipped() {
        let mut queue = RenderQueue::new();
        queue.enqueue(Batch {
            view: "a".into(),
            ops: vec![],
        });
        assert!(queue.is_idle());
    }

    #[test]
    fn purge_keeps_other_views() {
        let mut queue = RenderQueue::new();
        queue.enqueue(batch("a"));
        queue.enqueue(batch("b"));
        queue.enqueue(batch("a"));
        queue.purge("a");
        assert_eq!(queue.pending(), 1);
    }
}
