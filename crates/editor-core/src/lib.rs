//! LaunchReel Editor Core
//!
//! The [`Timeline`] aggregate owns clips, overlays, selection, clipboard,
//! zoom and the derived project duration. Every edit operation goes through
//! it and finishes by recomputing the derived fields (clip order, duration,
//! row packing) in the same call, so callers never observe a stale duration
//! next to fresh clip or overlay lists.
//!
//! Rejected edits (nothing to split, deleting the last clip, pasting with an
//! empty clipboard, ...) return an [`EditError`] and leave the timeline
//! untouched.
//!
//! This crate is pure computation: no I/O and no clocks.

pub mod clipboard;
pub mod clips;
pub mod commands;
pub mod drag;
pub mod error;
pub mod overlays;
pub mod ripple;
pub mod selection;
pub mod timeline;

pub use clipboard::Clipboard;
pub use clips::ResizeEdge;
pub use commands::{route_key, CommandOutcome, EditCommand, KeyInput};
pub use drag::{DragKind, DragSession, DragTarget};
pub use error::{EditError, EditResult};
pub use selection::Selection;
pub use timeline::Timeline;
