//! Editor server for sitegen.
//!
//! Serves the editor page with a sandboxed live preview, a JSON action API
//! and a WebSocket channel that pushes every session change to the browser.

pub mod live;
pub mod page;
pub mod server;
pub mod watcher;

pub use page::{PageContext, PageTemplates, SectionOption};
pub use server::{router, EditorServer, ServerConfig, ServerError, ServerState};
pub use watcher::{FormEvent, FormWatcher};
