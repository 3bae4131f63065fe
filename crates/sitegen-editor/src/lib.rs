//! Editing session for sitegen.
//!
//! [`Editor`] owns the page document, its undo history and the form values,
//! and runs every user action against them. Generation actions go through a
//! single fetch slot: while one is in flight, another fails with
//! [`EditorError::Busy`] instead of racing it.

pub mod editor;
pub mod events;

pub use editor::{ActionOutcome, Editor, EditorError, EditorOptions, EditorSnapshot, Status};
pub use events::{EditorEvent, EventHub, NoticeLevel};
