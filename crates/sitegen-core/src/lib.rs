//! Block document model for sitegen.
//!
//! A page is an ordered sequence of named HTML fragments. This crate owns that
//! sequence, the snapshot history used for undo, and the form values that feed
//! every generation request.

pub mod block;
pub mod document;
pub mod export;
pub mod form;
pub mod history;

pub use block::{Block, BlockName, UnknownBlockName};
pub use document::{Document, DocumentError};
pub use export::{save_to_file, SAVE_FILE_NAME, SAVE_MIME_TYPE};
pub use form::{FormError, FormField, FormPatch, FormValues};
pub use history::{History, DEFAULT_HISTORY_LIMIT};
