//! sandbox
//!
//! Open/reset lifecycle of one visualization instance.
//!
//! # Lifecycle
//!
//! ```text
//! open(name) ──> restore saved history or seed a fresh workspace
//!            ──> attach views, queue a full render, bind listeners
//! run_line   ──> interpreter (or undo/redo) ──> history + storage ──> render delta
//! reset()    ──> hide container, clear listeners and queued drawing
//! ```
//!
//! Opening while already open resets first, so listeners of the previous
//! instance never survive.
//!
//! # Persistence
//!
//! The whole undo history is written under the configured storage key after
//! every state change. On open it is read back, legacy default-branch names
//! are normalized, and the normalized history is written back. Any storage
//! or decoding failure means "no saved state": a warning, then a fresh
//! start.
//!
//! # Example
//!
//! ```
//! use gitsketch::core::config::Config;
//! use gitsketch::render::RecordingRenderer;
//! use gitsketch::sandbox::Coordinator;
//! use gitsketch::storage::MemoryStore;
//! use gitsketch::ui::output::Verbosity;
//!
//! let mut sandbox = Coordinator::new(
//!     Config::default(),
//!     Box::new(MemoryStore::new()),
//!     RecordingRenderer::new(),
//!     Verbosity::Quiet,
//! )
//! .unwrap();
//!
//! sandbox.open("Demo").unwrap();
//! assert!(sandbox.run_line("git commit -m second").is_success());
//! assert!(sandbox.run_line("undo").is_success());
//! assert!(sandbox.run_line("redo").is_success());
//! ```

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::graph::GraphError;
use crate::core::history::{HistoryEntry, HistoryError, UndoHistory};
use crate::core::layout::Dimensions;
use crate::core::snapshot::{SnapshotCodec, SnapshotError};
use crate::core::state::GraphState;
use crate::core::types::{RefName, TypeError};
use crate::engine::command::{Command, CommandError, CommandOutput, Outcome};
use crate::engine::interpreter::{Interpreter, Workspace};
use crate::render::{
    Canvas, ListenerKind, ListenerRegistry, RenderError, RenderSync, Renderer, Selection, UiEvent,
};
use crate::storage::{KeyValueStore, StoreError};
use crate::ui::output::{self, Verbosity};

/// Prefix of container element ids.
pub const CONTAINER_PREFIX: &str = "ExplainGit";

/// Width of the origin view.
const ORIGIN_WIDTH: i32 = 300;

const LOCAL_VIEW: &str = "local";
const ORIGIN_VIEW: &str = "origin";

/// Errors from the sandbox lifecycle.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("no sandbox is open")]
    NotOpen,

    #[error("container '{0}' not found")]
    ContainerNotFound(String),

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Handle of one open instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SandboxId(Uuid);

impl SandboxId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of the open instance.
struct Session {
    id: SandboxId,
    name: String,
    container: String,
    interpreter: Interpreter,
    history: UndoHistory,
}

/// Owns the sandbox lifecycle and wires interpreter, history, storage and
/// rendering together.
pub struct Coordinator<R: Renderer> {
    config: Config,
    codec: SnapshotCodec,
    store: Box<dyn KeyValueStore>,
    renderer: R,
    verbosity: Verbosity,
    render: RenderSync,
    listeners: ListenerRegistry,
    session: Option<Session>,
}

impl<R: Renderer> Coordinator<R> {
    /// Create a coordinator. Nothing is opened yet.
    ///
    /// # Errors
    ///
    /// Fails if the configured default branch is not a valid ref name.
    pub fn new(
        config: Config,
        store: Box<dyn KeyValueStore>,
        renderer: R,
        verbosity: Verbosity,
    ) -> Result<Self, SandboxError> {
        let default_branch = RefName::new(config.default_branch())?;
        let codec = SnapshotCodec::new(default_branch, config.remote_name())
            .with_legacy_names(config.legacy_default_branches())
            .with_dimensions(config.dimensions());

        Ok(Self {
            config,
            codec,
            store,
            renderer,
            verbosity,
            render: RenderSync::new(),
            listeners: ListenerRegistry::new(),
            session: None,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the sandbox `name`, restoring saved history when there is one.
    ///
    /// # Errors
    ///
    /// Fails if the container is missing or a fresh workspace cannot be
    /// seeded. Storage problems are warnings, not errors.
    pub fn open(&mut self, name: &str) -> Result<SandboxId, SandboxError> {
        if self.reset() {
            output::debug("closed previous sandbox before reopening", self.verbosity);
        }

        let container = format!("#{CONTAINER_PREFIX}{name}-Container");
        let found = self.renderer.select(&container).node();
        if found.is_none() {
            return Err(SandboxError::ContainerNotFound(container));
        }

        let (interpreter, history) = match self.restore() {
            Some(restored) => restored,
            None => self.seed(name)?,
        };

        let id = SandboxId::new();
        output::debug(format!("opened sandbox {name} ({id})"), self.verbosity);

        self.renderer
            .select(&container)
            .style("display", "block");

        let radius = self.config.dimensions().commit_radius;
        let local_root = format!("{container} svg.{LOCAL_VIEW}");
        self.render
            .attach(LOCAL_VIEW, Canvas::new(local_root.clone(), radius));
        self.render
            .full(LOCAL_VIEW, &interpreter.workspace().local)?;
        if let Some(origin) = interpreter.workspace().origin.as_ref() {
            self.render
                .attach(ORIGIN_VIEW, Canvas::new(format!("{container} svg.{ORIGIN_VIEW}"), radius));
            self.render.full(ORIGIN_VIEW, origin)?;
        }
        self.render.pump(&self.renderer);

        for kind in [ListenerKind::RefLabel, ListenerKind::CommitNode] {
            let listener = self.listeners.register(kind);
            self.renderer
                .select(&local_root)
                .on(kind.event_name(), listener);
        }

        self.session = Some(Session {
            id,
            name: name.to_string(),
            container,
            interpreter,
            history,
        });
        self.persist();
        Ok(id)
    }

    /// Tear down the open instance: hide its container, drop listeners and
    /// queued drawing. Returns whether anything was open.
    pub fn reset(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        self.renderer
            .select(&session.container)
            .style("display", "none");
        self.renderer
            .select_all("a.openswitch")
            .classed("selected", false);
        let dropped = self.listeners.clear();
        self.render.clear();

        output::debug(
            format!("reset sandbox {} ({} listeners dropped)", session.name, dropped),
            self.verbosity,
        );
        true
    }

    /// Delete the saved history.
    pub fn clear_saved_state(&self) -> Result<(), SandboxError> {
        Ok(self.store.remove(self.config.storage_key())?)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run one input line. `undo` and `redo` are handled here; everything
    /// else goes to the interpreter.
    pub fn run_line(&mut self, line: &str) -> CommandOutput<Outcome> {
        match line.trim() {
            "undo" | "git undo" => return self.step(true).into(),
            "redo" | "git redo" => return self.step(false).into(),
            _ => {}
        }

        let Some(session) = self.session.as_mut() else {
            return CommandOutput::Failed {
                error: SandboxError::NotOpen.to_string(),
            };
        };

        output::debug(format!("run: {line}"), self.verbosity);
        let result = session.interpreter.run_line(line);
        if let CommandOutput::Success(outcome) = &result {
            if outcome.changed {
                if let Err(e) = self.record(line) {
                    output::warn(format!("cannot record state: {e}"), self.verbosity);
                }
            }
        }
        result
    }

    /// Run the command a UI interaction stands for. Returns `None` when no
    /// listener for that interaction is bound.
    pub fn handle_event(&mut self, event: &UiEvent) -> Option<CommandOutput<Outcome>> {
        if !self.listeners.is_listening(event.kind()) {
            return None;
        }
        Some(self.run_line(&event.command_line()))
    }

    fn step(&mut self, back: bool) -> Result<Outcome, SandboxError> {
        let session = self.session.as_mut().ok_or(SandboxError::NotOpen)?;
        let undone = session.history.current().command.clone();

        let entry = if back {
            session.history.undo().cloned()
        } else {
            session.history.redo().cloned()
        };
        let Some(entry) = entry else {
            let what = if back { "undo" } else { "redo" };
            return Ok(Outcome::unchanged(format!("Nothing to {what}.")));
        };

        let workspace = match decode(&self.codec, &entry) {
            Ok(workspace) => workspace,
            Err(e) => {
                // Put the pointer back so history and workspace agree.
                if back {
                    session.history.redo();
                } else {
                    session.history.undo();
                }
                return Err(e);
            }
        };
        session.interpreter.replace(workspace);

        self.render.full(LOCAL_VIEW, &session.interpreter.workspace().local)?;
        if let Some(origin) = session.interpreter.workspace().origin.as_ref() {
            self.render.full(ORIGIN_VIEW, origin)?;
        }
        self.render.pump(&self.renderer);
        self.persist();

        let (verb, command) = if back {
            ("Undid", undone)
        } else {
            ("Redid", entry.command)
        };
        let message = match command {
            Some(command) => format!("{verb}: {command}"),
            None => format!("{verb}."),
        };
        Ok(Outcome::changed(message))
    }

    /// Push the current workspace onto the history, save, and queue the
    /// render delta.
    fn record(&mut self, line: &str) -> Result<(), SandboxError> {
        let session = self.session.as_mut().ok_or(SandboxError::NotOpen)?;
        let entry = encode(&self.codec, session.interpreter.workspace())?.with_command(line);
        session.history.push(entry);

        self.render.sync(LOCAL_VIEW, &session.interpreter.workspace().local)?;
        if let Some(origin) = session.interpreter.workspace().origin.as_ref() {
            self.render.sync(ORIGIN_VIEW, origin)?;
        }
        self.render.pump(&self.renderer);
        self.persist();
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Saved history and the workspace it points at, if both decode.
    fn restore(&self) -> Option<(Interpreter, UndoHistory)> {
        let key = self.config.storage_key();
        let json = match self.store.get(key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                output::warn(format!("no saved state: {e}"), self.verbosity);
                return None;
            }
        };

        let mut history = match UndoHistory::from_json(&json) {
            Ok(history) => history,
            Err(e) => {
                output::warn(format!("no saved state: {e}"), self.verbosity);
                return None;
            }
        };
        history.normalize(&self.codec);

        match decode(&self.codec, history.current()) {
            Ok(workspace) => {
                output::debug(
                    format!("restored {} history entries from '{key}'", history.len()),
                    self.verbosity,
                );
                Some((Interpreter::new(workspace), history))
            }
            Err(e) => {
                output::warn(format!("no saved state: {e}"), self.verbosity);
                None
            }
        }
    }

    /// A fresh workspace: one initial commit, pushed to the origin when
    /// there is one.
    fn seed(&self, name: &str) -> Result<(Interpreter, UndoHistory), SandboxError> {
        let default_branch = RefName::new(self.config.default_branch())?;
        let dimensions = self.config.dimensions();
        let with_origin = self.config.origin_enabled();

        let remote = with_origin.then(|| self.config.remote_name().to_string());
        let local = GraphState::new(name, default_branch.clone(), dimensions, remote);
        let origin = with_origin.then(|| {
            GraphState::new(
                format!("{name}-Origin"),
                default_branch,
                Dimensions {
                    width: ORIGIN_WIDTH,
                    ..dimensions
                },
                None,
            )
        });

        let mut interpreter = Interpreter::new(Workspace::new(local, origin));
        interpreter.apply(&Command::Commit {
            message: Some("Initial commit".to_string()),
            amend: false,
        })?;
        if with_origin {
            interpreter.apply(&Command::Push {
                remote: None,
                branch: None,
                force: false,
            })?;
        }

        let history = UndoHistory::new(encode(&self.codec, interpreter.workspace())?);
        Ok((interpreter, history))
    }

    /// Write the history. Failures are warnings.
    fn persist(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let result = session
            .history
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(self.config.storage_key(), &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            output::warn(format!("cannot save state: {e}"), self.verbosity);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Draw the next queued batch if nothing is animating.
    pub fn pump_render(&mut self) -> bool {
        self.render.pump(&self.renderer)
    }

    /// The renderer finished the batch in flight; draw the next one.
    pub fn animation_finished(&mut self) -> bool {
        self.render.animation_finished();
        self.render.pump(&self.renderer)
    }

    /// Draw everything queued without waiting. Returns batches drawn.
    pub fn flush_render(&mut self) -> usize {
        self.render.drain(&self.renderer)
    }

    pub fn render_idle(&self) -> bool {
        self.render.is_idle()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn id(&self) -> Option<SandboxId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    /// The local and origin states of the open instance.
    pub fn workspace(&self) -> Option<&Workspace> {
        self.session.as_ref().map(|s| s.interpreter.workspace())
    }

    pub fn history(&self) -> Option<&UndoHistory> {
        self.session.as_ref().map(|s| &s.history)
    }

    /// Snapshot token of the local view.
    pub fn export(&self) -> Result<String, SandboxError> {
        let workspace = self.workspace().ok_or(SandboxError::NotOpen)?;
        Ok(self.codec.serialize(&workspace.local)?)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn encode(codec: &SnapshotCodec, workspace: &Workspace) -> Result<HistoryEntry, SandboxError> {
    let hv = codec.serialize(&workspace.local)?;
    let ov = match workspace.origin.as_ref() {
        Some(origin) => Some(codec.serialize(origin)?),
        None => None,
    };
    Ok(HistoryEntry::new(hv, ov))
}

fn decode(codec: &SnapshotCodec, entry: &HistoryEntry) -> Result<Workspace, SandboxError> {
    let local = codec.deserialize(&entry.hv)?;
    let origin = match entry.ov.as_deref() {
        Some(token) => Some(codec.deserialize(token)?),
        None => None,
    };
    Ok(Workspace::new(local, origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::storage::MemoryStore;

    fn coordinator() -> Coordinator<RecordingRenderer> {
        Coordinator::new(
            Config::default(),
            Box::new(MemoryStore::new()),
            RecordingRenderer::new(),
            Verbosity::Quiet,
        )
        .unwrap()
    }

    #[test]
    fn fresh_open_seeds_initial_commit_and_origin() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();

        let ws = sandbox.workspace().unwrap();
        assert_eq!(ws.local.graph.len(), 1);
        let origin = ws.origin.as_ref().unwrap();
        assert_eq!(origin.meta.name, "Zen-Origin");
        assert_eq!(origin.layout.dimensions().width, ORIGIN_WIDTH);
        assert_eq!(
            origin.graph.head_commit(),
            ws.local.graph.head_commit()
        );
        assert!(ws
            .local
            .graph
            .get_ref(&RefName::new("origin/main").unwrap())
            .is_some());
        assert_eq!(sandbox.history().unwrap().len(), 1);
    }

    #[test]
    fn reopening_does_not_leak_listeners() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();
        assert_eq!(sandbox.listener_count(), 2);
        sandbox.open("Zen").unwrap();
        assert_eq!(sandbox.listener_count(), 2);
    }

    #[test]
    fn reset_hides_and_clears() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();
        sandbox.renderer().take();

        assert!(sandbox.reset());
        assert!(!sandbox.is_open());
        assert_eq!(sandbox.listener_count(), 0);

        let calls: Vec<String> = sandbox
            .renderer()
            .calls()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(calls.contains(&"#ExplainGitZen-Container style display=none".to_string()));
        assert!(calls.contains(&"a.openswitch classed selected=false".to_string()));
        assert!(!sandbox.reset());
    }

    #[test]
    fn unchanged_commands_are_not_recorded() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();
        assert!(sandbox.run_line("log").is_success());
        assert!(sandbox.run_line("merge main").is_success());
        assert!(sandbox.run_line("merge nowhere").is_failed());
        assert_eq!(sandbox.history().unwrap().len(), 1);
    }

    #[test]
    fn undo_and_redo_restore_states() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();
        sandbox.run_line("commit -m second");
        let after = sandbox.workspace().unwrap().clone();

        let undo = sandbox.run_line("undo").into_result().unwrap();
        assert_eq!(undo.message, "Undid: commit -m second");
        assert_eq!(sandbox.workspace().unwrap().local.graph.len(), 1);

        sandbox.run_line("redo").into_result().unwrap();
        assert_eq!(sandbox.workspace().unwrap().local.graph.len(), after.local.graph.len());

        let nothing = sandbox.run_line("redo").into_result().unwrap();
        assert_eq!(nothing.message, "Nothing to redo.");
    }

    #[test]
    fn ui_events_run_checkout() {
        let mut sandbox = coordinator();
        sandbox.open("Zen").unwrap();
        sandbox.run_line("branch topic");

        let output = sandbox
            .handle_event(&UiEvent::SelectRef(RefName::new("topic").unwrap()))
            .unwrap();
        assert!(output.is_success());
        assert_eq!(
            sandbox.workspace().unwrap().local.graph.current_branch(),
            Some(&RefName::new("topic").unwrap())
        );

        sandbox.reset();
        assert!(sandbox
            .handle_event(&UiEvent::SelectRef(RefName::new("main").unwrap()))
            .is_none());
    }

    #[test]
    fn commands_need_an_open_sandbox() {
        let mut sandbox = coordinator();
        let output = sandbox.run_line("commit");
        assert_eq!(output.into_result().unwrap_err(), "no sandbox is open");
    }
}
