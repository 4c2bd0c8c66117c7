//! render
//!
//! Keeps the picture of each view in step with the model.
//!
//! # Architecture
//!
//! - [`projection`]: what of a state is visible
//! - [`delta`]: ordered [`VisualOp`]s between two projections
//! - [`queue`]: batches waiting behind an in-flight animation
//! - [`draw`]: ops to renderer calls
//! - [`renderer`]: the `select`/`selectAll` boundary and a recording backend
//! - [`events`]: UI interactions mapped back to command lines
//! - [`text`]: plain-text drawing for terminals
//!
//! [`RenderSync`] ties projection, delta and queue together per view.

pub mod delta;
pub mod draw;
pub mod events;
pub mod projection;
pub mod queue;
pub mod renderer;
pub mod sync;
pub mod text;

pub use delta::VisualOp;
pub use draw::Canvas;
pub use events::{ListenerId, ListenerKind, ListenerRegistry, UiEvent};
pub use projection::Projection;
pub use renderer::{DrawAction, DrawCall, RecordingRenderer, Renderer, Selection};
pub use sync::{RenderError, RenderSync};
pub use text::draw_text;
