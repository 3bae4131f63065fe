//! The editing session and its actions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sitegen_core::{
    save_to_file, Block, BlockName, Document, DocumentError, FormPatch, FormValues, History,
    DEFAULT_HISTORY_LIMIT,
};
use sitegen_gateway::{Gateway, GatewayError, Generated};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::events::{EditorEvent, EventHub, NoticeLevel};

/// Whether a generation request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Fetching,
}

/// Errors returned by editor actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("A generation request is already in progress")]
    Busy,

    #[error("Generation failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{0} cannot be added as a section")]
    NotAddable(BlockName),

    #[error("{0} cannot be regenerated")]
    NotRegenerable(BlockName),

    #[error("No block has been added yet")]
    NothingToRegenerate,

    #[error("The target block was removed while it was being generated")]
    StaleTarget,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to save page: {0}")]
    Io(String),
}

/// Result of a successful generation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// Index of the block that was written
    pub index: usize,

    /// The gateway succeeded but returned no markup
    pub empty: bool,
}

/// Initial state of a session.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Starting document
    pub document: Document,

    /// Form values carried over from the previous step
    pub form: FormValues,

    /// Maximum undo depth
    pub history_limit: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            document: Document::scaffold(),
            form: FormValues::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub blocks: Vec<Block>,
    pub code: String,
    pub status: Status,
    pub history: usize,
    pub last_inserted: Option<usize>,
    pub form: FormValues,
    pub form_summary: String,
}

struct Session {
    document: Document,
    history: History,
    form: FormValues,
    last_inserted: Option<usize>,
}

/// Releases the fetch slot when dropped, on success and failure alike.
struct FetchGuard {
    _slot: OwnedMutexGuard<()>,
    fetching: Arc<AtomicBool>,
    events: EventHub,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.fetching.store(false, Ordering::SeqCst);
        self.events.send(EditorEvent::Status {
            status: Status::Idle,
        });
    }
}

/// Handle to one editing session.
///
/// Clones share the same session. Every mutation goes through a single commit
/// path that snapshots the previous document into the undo history.
#[derive(Clone)]
pub struct Editor {
    session: Arc<RwLock<Session>>,
    slot: Arc<Mutex<()>>,
    fetching: Arc<AtomicBool>,
    gateway: Arc<dyn Gateway>,
    events: EventHub,
}

impl Editor {
    /// Create a session backed by `gateway`.
    pub fn new(gateway: Arc<dyn Gateway>, options: EditorOptions) -> Self {
        let session = Session {
            document: options.document,
            history: History::with_limit(options.history_limit),
            form: options.form,
            last_inserted: None,
        };

        Self {
            session: Arc::new(RwLock::new(session)),
            slot: Arc::new(Mutex::new(())),
            fetching: Arc::new(AtomicBool::new(false)),
            gateway,
            events: EventHub::new(),
        }
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn status(&self) -> Status {
        if self.fetching.load(Ordering::SeqCst) {
            Status::Fetching
        } else {
            Status::Idle
        }
    }

    pub async fn document(&self) -> Document {
        self.session.read().await.document.clone()
    }

    /// Concatenated page markup.
    ///
    /// Preview, copy and save all read this value.
    pub async fn code(&self) -> String {
        self.session.read().await.document.code()
    }

    pub async fn form(&self) -> FormValues {
        self.session.read().await.form.clone()
    }

    pub async fn history_len(&self) -> usize {
        self.session.read().await.history.len()
    }

    pub async fn last_inserted(&self) -> Option<usize> {
        self.session.read().await.last_inserted
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        let session = self.session.read().await;
        EditorSnapshot {
            blocks: session.document.blocks().to_vec(),
            code: session.document.code(),
            status: self.status(),
            history: session.history.len(),
            last_inserted: session.last_inserted,
            form: session.form.clone(),
            form_summary: session.form.summary(),
        }
    }

    /// Event describing the current document, for newly connected subscribers.
    pub async fn document_event(&self) -> EditorEvent {
        document_event(&*self.session.read().await)
    }

    /// Apply a partial form update.
    pub async fn update_form(&self, patch: FormPatch) -> FormValues {
        let mut session = self.session.write().await;
        session.form.apply(patch);
        let form = session.form.clone();
        drop(session);

        self.events.send(EditorEvent::FormChanged {
            summary: form.summary(),
        });
        form
    }

    /// Replace the form values wholesale.
    pub async fn replace_form(&self, form: FormValues) {
        let summary = form.summary();
        self.session.write().await.form = form;
        self.events.send(EditorEvent::FormChanged { summary });
    }

    /// Generate the head block and write it at index 0.
    pub async fn generate_head(&self) -> Result<ActionOutcome, EditorError> {
        let _guard = self.begin_fetch()?;
        let (form, code) = {
            let session = self.session.read().await;
            (session.form.clone(), session.document.code())
        };

        tracing::info!("Generating head");
        let generated = self
            .settle(BlockName::Head, self.gateway.create_head_info(&form, &code).await)?;
        let empty = generated.is_empty();

        self.commit(|doc, _| {
            doc.set_head(generated.into_content());
            Ok(ActionOutcome { index: 0, empty })
        })
        .await
    }

    /// Generate a section and insert it before the trailing anchor.
    ///
    /// `additional_info` replaces the form's free-text notes first, when given.
    pub async fn add_block(
        &self,
        name: BlockName,
        additional_info: Option<String>,
    ) -> Result<ActionOutcome, EditorError> {
        if !name.is_addable() {
            return Err(EditorError::NotAddable(name));
        }

        let _guard = self.begin_fetch()?;
        if let Some(info) = additional_info {
            self.update_form(FormPatch {
                additional_info: Some(info),
                ..Default::default()
            })
            .await;
        }
        let form = self.form().await;

        tracing::info!("Generating {}", name);
        let generated = self
            .settle(name, self.gateway.create_html_block(name, &form).await)?;
        let empty = generated.is_empty();

        self.commit(|doc, last_inserted| {
            let index = doc.insert_before_anchor(name, generated.into_content());
            *last_inserted = Some(index);
            Ok(ActionOutcome { index, empty })
        })
        .await
    }

    /// Generate the most recently added block again, replacing its content.
    ///
    /// The document length never changes. This is what the "Redo" button
    /// does; there is no replay of undone states.
    pub async fn regenerate_last(&self) -> Result<ActionOutcome, EditorError> {
        let (block_id, name) = {
            let session = self.session.read().await;
            let block = session
                .last_inserted
                .and_then(|index| session.document.get(index))
                .ok_or(EditorError::NothingToRegenerate)?;
            (block.id, block.name)
        };
        if name == BlockName::Anchor {
            return Err(EditorError::NotRegenerable(name));
        }

        let _guard = self.begin_fetch()?;
        let (form, code) = {
            let session = self.session.read().await;
            (session.form.clone(), session.document.code())
        };

        tracing::info!("Regenerating {}", name);
        let result = if name == BlockName::Head {
            self.gateway.create_head_info(&form, &code).await
        } else {
            self.gateway.create_html_block(name, &form).await
        };
        let generated = self.settle(name, result)?;
        let empty = generated.is_empty();

        // The block may have moved while the request was in flight
        self.commit(|doc, _| {
            let index = doc
                .blocks()
                .iter()
                .position(|b| b.id == block_id)
                .ok_or(EditorError::StaleTarget)?;
            doc.update_at(index, generated.into_content())?;
            Ok(ActionOutcome { index, empty })
        })
        .await
    }

    /// Restore the previous document. Returns `false` when there is nothing to undo.
    pub async fn undo(&self) -> bool {
        let mut session = self.session.write().await;
        let Some(previous) = session.history.pop() else {
            tracing::debug!("Nothing to undo");
            return false;
        };
        session.document = previous;
        let event = document_event(&session);
        drop(session);

        self.events.send(event);
        true
    }

    /// Move a block from one position to another.
    ///
    /// Reordering is undoable like every other mutation, and the
    /// regenerate-last target follows the block it pointed at.
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), EditorError> {
        if from == to {
            let len = self.session.read().await.document.len();
            if from >= len {
                return Err(DocumentError::OutOfRange { index: from, len }.into());
            }
            return Ok(());
        }

        self.commit(|doc, last_inserted| {
            doc.move_block(from, to)?;
            *last_inserted = last_inserted.map(|index| follow_move(index, from, to));
            Ok(())
        })
        .await
    }

    /// Write the page to `your-website.html` inside `dir`.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, EditorError> {
        let code = self.code().await;
        save_to_file(dir, &code).map_err(|e| {
            tracing::error!("Failed to save page: {}", e);
            EditorError::Io(e.to_string())
        })
    }

    fn begin_fetch(&self) -> Result<FetchGuard, EditorError> {
        let slot = Arc::clone(&self.slot)
            .try_lock_owned()
            .map_err(|_| EditorError::Busy)?;

        self.fetching.store(true, Ordering::SeqCst);
        self.events.send(EditorEvent::Status {
            status: Status::Fetching,
        });

        Ok(FetchGuard {
            _slot: slot,
            fetching: Arc::clone(&self.fetching),
            events: self.events.clone(),
        })
    }

    /// Report the gateway result to the user before it is committed.
    fn settle(
        &self,
        name: BlockName,
        result: Result<Generated, GatewayError>,
    ) -> Result<Generated, EditorError> {
        match result {
            Ok(Generated::Empty) => {
                tracing::warn!("{} gateway returned no content for {}", self.gateway.name(), name);
                self.events.send(EditorEvent::Notice {
                    level: NoticeLevel::Warning,
                    message: format!("The generator returned no content for {}", name),
                });
                Ok(Generated::Empty)
            }
            Ok(generated) => Ok(generated),
            Err(e) => {
                tracing::warn!("Failed to generate {}: {}", name, e);
                self.events.send(EditorEvent::Notice {
                    level: NoticeLevel::Error,
                    message: format!("Failed to generate {}: {}", name, e),
                });
                Err(e.into())
            }
        }
    }

    /// Apply `mutate` to a copy of the document and swap it in atomically.
    ///
    /// On success the previous document is pushed onto the history; on error
    /// the session is left untouched.
    async fn commit<T, F>(&self, mutate: F) -> Result<T, EditorError>
    where
        F: FnOnce(&mut Document, &mut Option<usize>) -> Result<T, EditorError>,
    {
        let mut session = self.session.write().await;
        let mut next = session.document.clone();
        let mut last_inserted = session.last_inserted;

        let value = mutate(&mut next, &mut last_inserted)?;

        let previous = std::mem::replace(&mut session.document, next);
        session.history.push(previous);
        session.last_inserted = last_inserted;
        let event = document_event(&session);
        drop(session);

        self.events.send(event);
        Ok(value)
    }
}

fn document_event(session: &Session) -> EditorEvent {
    EditorEvent::DocumentChanged {
        code: session.document.code(),
        blocks: session.document.blocks().to_vec(),
        history: session.history.len(),
        last_inserted: session.last_inserted,
    }
}

/// Where the block at `index` ends up after moving `from` to `to`.
fn follow_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
