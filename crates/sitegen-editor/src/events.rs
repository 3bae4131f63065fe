//! Change notifications broadcast by the editor.

use serde::{Deserialize, Serialize};
use sitegen_core::Block;
use tokio::sync::broadcast;

use crate::editor::Status;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Messages sent to every subscriber when the session changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// The document was replaced
    DocumentChanged {
        /// Concatenated page markup
        code: String,
        /// Blocks in order
        blocks: Vec<Block>,
        /// Snapshots available for undo
        history: usize,
        /// Index regenerate-last would target
        last_inserted: Option<usize>,
    },

    /// The fetch slot was taken or released
    Status { status: Status },

    /// Something the user should see
    Notice { level: NoticeLevel, message: String },

    /// Form values changed
    FormChanged { summary: String },
}

/// Hub for broadcasting editor events to all subscribers.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send an event to all subscribers.
    pub fn send(&self, event: EditorEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_events() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();

        hub.send(EditorEvent::Status {
            status: Status::Fetching,
        });

        match rx.try_recv() {
            Ok(EditorEvent::Status { status }) => assert_eq!(status, Status::Fetching),
            other => panic!("Expected status event, got {:?}", other),
        }
    }

    #[test]
    fn counts_live_subscribers() {
        let hub = EventHub::new();
        assert_eq!(hub.subscriber_count(), 0);

        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = EditorEvent::Notice {
            level: NoticeLevel::Error,
            message: "Request timed out".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains(r#""type":"notice""#));
        assert!(json.contains(r#""level":"error""#));
    }
}
