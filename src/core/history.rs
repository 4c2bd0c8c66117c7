//! core::history
//!
//! Undo history: full-state snapshots plus a pointer to the current one.
//!
//! Each entry holds the snapshot tokens of the local view (`hv`) and, when
//! there is one, the origin view (`ov`). Undo and redo only move the pointer;
//! pushing a new entry after an undo drops everything after the pointer.
//!
//! # Storage Format
//!
//! ```json
//! { "pointer": 1, "stack": [ { "hv": "{...}" }, { "hv": "{...}", "ov": "{...}", "command": "git commit" } ] }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::snapshot::SnapshotCodec;
use super::types::UtcTimestamp;

/// Errors from history decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("failed to parse undo history: {0}")]
    ParseError(String),

    #[error("undo history is empty")]
    Empty,

    #[error("undo pointer {pointer} is out of range for {len} entries")]
    PointerOutOfRange { pointer: usize, len: usize },
}

/// One recorded state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local view token.
    pub hv: String,
    /// Origin view token, if the sandbox has an origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ov: Option<String>,
    /// Input line that produced this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<UtcTimestamp>,
}

impl HistoryEntry {
    pub fn new(hv: String, ov: Option<String>) -> Self {
        Self {
            hv,
            ov,
            command: None,
            at: Some(UtcTimestamp::now()),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// Linear undo/redo stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoHistory {
    pointer: usize,
    stack: Vec<HistoryEntry>,
}

impl UndoHistory {
    /// Start a history at `initial`.
    pub fn new(initial: HistoryEntry) -> Self {
        Self {
            pointer: 0,
            stack: vec![initial],
        }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.stack
    }

    /// The entry the pointer is on.
    pub fn current(&self) -> &HistoryEntry {
        &self.stack[self.pointer]
    }

    /// Record a new state, discarding any redo entries.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.stack.truncate(self.pointer + 1);
        self.stack.push(entry);
        self.pointer = self.stack.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.stack.len()
    }

    /// Step back. Returns the entry to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        Some(self.current())
    }

    /// Step forward. Returns the entry to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        Some(self.current())
    }

    /// Rewrite legacy default-branch labels in every stored token.
    pub fn normalize(&mut self, codec: &SnapshotCodec) {
        for entry in &mut self.stack {
            entry.hv = codec.normalize_token(&entry.hv);
            if let Some(ov) = entry.ov.as_mut() {
                *ov = codec.normalize_token(ov);
            }
        }
    }

    /// Encode for storage.
    pub fn to_json(&self) -> Result<String, HistoryError> {
        serde_json::to_string(self).map_err(|e| HistoryError::ParseError(e.to_string()))
    }

    /// Decode from storage, checking the pointer.
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        let history: Self =
            serde_json::from_str(json).map_err(|e| HistoryError::ParseError(e.to_string()))?;
        if history.stack.is_empty() {
            return Err(HistoryError::Empty);
        }
        if history.pointer >= history.stack.len() {
            return Err(HistoryError::PointerOutOfRange {
                pointer: history.pointer,
                len: history.stack.len(),
            });
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hv: &str) -> HistoryEntry {
        HistoryEntry {
            hv: hv.into(),
            ov: None,
            command: None,
            at: None,
        }
    }

    fn history_of(n: usize) -> UndoHistory {
        let mut history = UndoHistory::new(entry("s0"));
        for i in 1..=n {
            history.push(entry(&format!("s{i}")));
        }
        history
    }

    mod stack {
        use super::*;

        #[test]
        fn new_history_has_nothing_to_undo() {
            let mut history = history_of(0);
            assert!(!history.can_undo());
            assert!(history.undo().is_none());
            assert!(history.redo().is_none());
        }

        #[test]
        fn undo_and_redo_walk_the_stack() {
            let mut history = history_of(2);
            assert_eq!(history.undo().unwrap().hv, "s1");
            assert_eq!(history.undo().unwrap().hv, "s0");
            assert!(history.undo().is_none());
            assert_eq!(history.redo().unwrap().hv, "s1");
            assert_eq!(history.current().hv, "s1");
        }

        #[test]
        fn push_after_undo_drops_redo() {
            let mut history = history_of(3);
            history.undo();
            history.undo();
            history.undo();
            history.push(entry("branch"));
            assert!(!history.can_redo());
            assert_eq!(history.len(), 2);
            assert_eq!(history.pointer(), 1);
        }
    }

    mod storage {
        use super::*;

        #[test]
        fn json_roundtrip() {
            let mut history = history_of(2);
            history.undo();
            let json = history.to_json().unwrap();
            assert_eq!(UndoHistory::from_json(&json).unwrap(), history);
        }

        #[test]
        fn bad_pointer_is_rejected() {
            let json = r#"{"pointer":3,"stack":[{"hv":"x"}]}"#;
            assert_eq!(
                UndoHistory::from_json(json),
                Err(HistoryError::PointerOutOfRange { pointer: 3, len: 1 })
            );
        }

        #[test]
        fn empty_stack_is_rejected() {
            let json = r#"{"pointer":0,"stack":[]}"#;
            assert_eq!(UndoHistory::from_json(json), Err(HistoryError::Empty));
        }

        #[test]
        fn garbage_is_a_parse_error() {
            assert!(matches!(
                UndoHistory::from_json("null"),
                Err(HistoryError::ParseError(_))
            ));
        }
    }
}
