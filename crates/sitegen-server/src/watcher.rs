//! Watching the form values file for external edits.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the form watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The form file was created or modified
    Changed(PathBuf),

    /// The form file was removed
    Removed(PathBuf),
}

/// Watches a single form file.
///
/// The parent directory is watched so that editors which replace the file on
/// save are still picked up.
pub struct FormWatcher {
    _watcher: RecommendedWatcher,
}

impl FormWatcher {
    /// Start watching `path`.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(path: &Path) -> Result<(Self, async_mpsc::Receiver<FormEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(16);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let target = absolute(path);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            let quiet = Duration::from_millis(100);
            while let Some(form_event) = next_settled(&sync_rx, &target, quiet) {
                if async_tx.blocking_send(form_event).is_err() {
                    break;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Wait for the next event on the target, then keep reading until `quiet`
/// passes without one and return the last.
///
/// Editors that truncate and then write produce several events per save; the
/// reload must see the final one. Returns `None` once the channel closes.
fn next_settled(
    rx: &mpsc::Receiver<notify::Event>,
    target: &Path,
    quiet: Duration,
) -> Option<FormEvent> {
    let mut pending = loop {
        let event = rx.recv().ok()?;
        if let Some(form_event) = classify_event(target, &event) {
            break form_event;
        }
    };

    loop {
        match rx.recv_timeout(quiet) {
            Ok(event) => {
                if let Some(form_event) = classify_event(target, &event) {
                    pending = form_event;
                }
            }
            Err(_) => return Some(pending),
        }
    }
}

/// Classify a notify event for the watched file.
fn classify_event(target: &Path, event: &notify::Event) -> Option<FormEvent> {
    use notify::event::{AccessKind, AccessMode};
    use notify::EventKind;

    if !event.paths.iter().any(|p| p == target) {
        return None;
    }

    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(_)
        | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
            Some(FormEvent::Changed(target.to_path_buf()))
        }
        EventKind::Remove(_) => Some(FormEvent::Removed(target.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, AccessMode};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn ignores_other_files() {
        let target = PathBuf::from("/tmp/site/form.json");
        let event = notify::Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/site/other.json"));

        assert_eq!(classify_event(&target, &event), None);
    }

    #[test]
    fn classifies_target_changes() {
        let target = PathBuf::from("/tmp/site/form.json");
        let modify = notify::Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(target.clone());
        let remove = notify::Event::new(notify::EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(target.clone());

        assert_eq!(
            classify_event(&target, &modify),
            Some(FormEvent::Changed(target.clone()))
        );
        assert_eq!(
            classify_event(&target, &remove),
            Some(FormEvent::Removed(target))
        );
    }

    #[test]
    fn treats_close_after_write_as_change() {
        let target = PathBuf::from("/tmp/site/form.json");
        let close = notify::Event::new(notify::EventKind::Access(AccessKind::Close(
            AccessMode::Write,
        )))
        .add_path(target.clone());
        let open = notify::Event::new(notify::EventKind::Access(AccessKind::Open(
            AccessMode::Any,
        )))
        .add_path(target.clone());

        assert_eq!(
            classify_event(&target, &close),
            Some(FormEvent::Changed(target.clone()))
        );
        assert_eq!(classify_event(&target, &open), None);
    }

    #[test]
    fn settles_on_the_last_event_of_a_burst() {
        let target = PathBuf::from("/tmp/site/form.json");
        let (tx, rx) = mpsc::channel();
        let event = |kind| notify::Event::new(kind).add_path(target.clone());

        tx.send(event(notify::EventKind::Remove(notify::event::RemoveKind::File)))
            .unwrap();
        tx.send(event(notify::EventKind::Create(notify::event::CreateKind::File)))
            .unwrap();
        tx.send(event(notify::EventKind::Modify(notify::event::ModifyKind::Any)))
            .unwrap();
        drop(tx);

        let quiet = Duration::from_millis(10);
        assert_eq!(
            next_settled(&rx, &target, quiet),
            Some(FormEvent::Changed(target.clone()))
        );
        assert_eq!(next_settled(&rx, &target, quiet), None);
    }

    #[tokio::test]
    async fn reports_form_file_writes() {
        let temp = tempdir().unwrap();
        let form = temp.path().join("form.json");

        let (watcher, mut rx) = FormWatcher::new(&form).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&form, r#"{"colors":"blue"}"#).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for form watch event");
        assert!(matches!(event.unwrap(), Some(FormEvent::Changed(_))));
    }
}
