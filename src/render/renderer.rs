//! render::renderer
//!
//! The drawing boundary.
//!
//! The core never inspects what is drawn. It selects nodes by selector and
//! issues chained calls on the selection, the way a declarative selection
//! library is driven. [`RecordingRenderer`] keeps every call for tracing
//! and tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::events::ListenerId;

/// Entry point of a drawing backend.
pub trait Renderer {
    type Selection: Selection;

    /// First node matching `selector`.
    fn select(&self, selector: &str) -> Self::Selection;

    /// Every node matching `selector`.
    fn select_all(&self, selector: &str) -> Self::Selection;
}

/// A chainable set of nodes.
pub trait Selection: Sized {
    fn attr(self, name: &str, value: &str) -> Self;
    fn classed(self, class: &str, enabled: bool) -> Self;
    fn style(self, name: &str, value: &str) -> Self;
    fn html(self, content: &str) -> Self;
    fn text(self, content: &str) -> Self;
    /// Append a child element and select it.
    fn append(self, tag: &str) -> Self;
    fn remove(self);
    fn on(self, event: &str, listener: ListenerId) -> Self;
    /// Identifier of the first selected node, if any.
    fn node(&self) -> Option<String>;
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub selector: String,
    pub action: DrawAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawAction {
    Select,
    SelectAll,
    Attr { name: String, value: String },
    Classed { class: String, enabled: bool },
    Style { name: String, value: String },
    Html(String),
    Text(String),
    Append(String),
    Remove,
    On { event: String, listener: ListenerId },
}

impl fmt::Display for DrawCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.selector)?;
        match &self.action {
            DrawAction::Select => write!(f, "select"),
            DrawAction::SelectAll => write!(f, "selectAll"),
            DrawAction::Attr { name, value } => write!(f, "attr {name}={value}"),
            DrawAction::Classed { class, enabled } => write!(f, "classed {class}={enabled}"),
            DrawAction::Style { name, value } => write!(f, "style {name}={value}"),
            DrawAction::Html(content) => write!(f, "html {content:?}"),
            DrawAction::Text(content) => write!(f, "text {content:?}"),
            DrawAction::Append(tag) => write!(f, "append {tag}"),
            DrawAction::Remove => write!(f, "remove"),
            DrawAction::On { event, listener } => write!(f, "on {event} -> {listener}"),
        }
    }
}

type CallLog = Rc<RefCell<Vec<DrawCall>>>;

/// Renderer that records calls instead of drawing.
///
/// Clones share one call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: CallLog,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.borrow().clone()
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    fn start(&self, selector: &str, action: DrawAction) -> RecordingSelection {
        let selection = RecordingSelection {
            selector: selector.to_string(),
            calls: Rc::clone(&self.calls),
        };
        selection.record(action);
        selection
    }
}

impl Renderer for RecordingRenderer {
    type Selection = RecordingSelection;

    fn select(&self, selector: &str) -> RecordingSelection {
        self.start(selector, DrawAction::Select)
    }

    fn select_all(&self, selector: &str) -> RecordingSelection {
        self.start(selector, DrawAction::SelectAll)
    }
}

/// Selection handed out by [`RecordingRenderer`].
#[derive(Debug, Clone)]
pub struct RecordingSelection {
    selector: String,
    calls: CallLog,
}

impl RecordingSelection {
    fn record(&self, action: DrawAction) {
        self.calls.borrow_mut().push(DrawCall {
            selector: self.selector.clone(),
            action,
        });
    }

    fn with(self, action: DrawAction) -> Self {
        self.record(action);
        self
    }
}

impl Selection for RecordingSelection {
    fn attr(self, name: &str, value: &str) -> Self {
        self.with(DrawAction::Attr {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn classed(self, class: &str, enabled: bool) -> Self {
        self.with(DrawAction::Classed {
            class: class.to_string(),
            enabled,
        })
    }

    fn style(self, name: &str, value: &str) -> Self {
        self.with(DrawAction::Style {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn html(self, content: &str) -> Self {
        self.with(DrawAction::Html(content.to_string()))
    }

    fn text(self, content: &str) -> Self {
        self.with(DrawAction::Text(content.to_string()))
    }

    fn append(self, tag: &str) -> Self {
        self.record(DrawAction::Append(tag.to_string()));
        Self {
            selector: format!("{} > {}", self.selector, tag),
            calls: self.calls,
        }
    }

    fn remove(self) {
        self.record(DrawAction::Remove);
    }

    fn on(self, event: &str, listener: ListenerId) -> Self {
        self.with(DrawAction::On {
            event: event.to_string(),
            listener,
        })
    }

    fn node(&self) -> Option<String> {
        Some(self.selector.clone())
    }
}
