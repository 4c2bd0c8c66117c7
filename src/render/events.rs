//! render::events
//!
//! UI affordances that feed back into the interpreter.
//!
//! Clicking a ref label checks that ref out; clicking a commit detaches
//! HEAD at it. Listeners are registered per open instance and cleared on
//! teardown so a reopened sandbox never answers with stale handlers.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::types::{CommitId, RefName};

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// What a listener reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    RefLabel,
    CommitNode,
}

impl ListenerKind {
    /// Namespaced event name bound on the view root.
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::RefLabel => "click.ref",
            ListenerKind::CommitNode => "click.commit",
        }
    }
}

/// An interaction reported by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectRef(RefName),
    SelectCommit(CommitId),
}

impl UiEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            UiEvent::SelectRef(_) => ListenerKind::RefLabel,
            UiEvent::SelectCommit(_) => ListenerKind::CommitNode,
        }
    }

    /// The command line this interaction stands for.
    pub fn command_line(&self) -> String {
        match self {
            UiEvent::SelectRef(name) => format!("checkout {name}"),
            UiEvent::SelectCommit(id) => format!("checkout {id}"),
        }
    }
}

/// Live listeners of one sandbox instance.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next: u64,
    active: BTreeMap<ListenerId, ListenerKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ListenerKind) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.active.insert(id, kind);
        id
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.active.values().any(|k| *k == kind)
    }

    /// Drop every listener, returning how many were live.
    pub fn clear(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_map_to_checkout() {
        let event = UiEvent::SelectRef(RefName::new("topic").unwrap());
        assert_eq!(event.command_line(), "checkout topic");
        assert_eq!(event.kind(), ListenerKind::RefLabel);
    }

    #[test]
    fn clear_drops_everything() {
        let mut registry = ListenerRegistry::new();
        let a = registry.register(ListenerKind::RefLabel);
        let b = registry.register(ListenerKind::CommitNode);
        assert_ne!(a, b);
        assert!(registry.is_listening(ListenerKind::CommitNode));
        assert_eq!(registry.clear(), 2);
        assert!(!registry.is_listening(ListenerKind::RefLabel));
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut registry = ListenerRegistry::new();
        let first = registry.register(ListenerKind::RefLabel);
        registry.clear();
        let second = registry.register(ListenerKind::RefLabel);
        assert_ne!(first, second);
    }
}
