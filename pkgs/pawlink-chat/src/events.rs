//! Change-notification hub shared by all chat components

use tokio::sync::broadcast;

/// A change marker published after every persisted mutation. Carries only
/// the affected event id; subscribers re-read the snapshot from storage.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The conversation record changed (creation, slot fill-in, lifecycle)
    ConversationChanged { event_id: String },
    /// The message log changed (append, read flags, deletion)
    MessagesChanged { event_id: String },
}

/// Broadcast hub fanning change markers out to any number of subscribers.
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct ChatEvents {
    tx: broadcast::Sender<ChatEvent>,
}

impl ChatEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn conversation_changed(&self, event_id: &str) {
        // Send only fails when nobody is subscribed
        let _ = self.tx.send(ChatEvent::ConversationChanged {
            event_id: event_id.to_string(),
        });
    }

    pub(crate) fn messages_changed(&self, event_id: &str) {
        let _ = self.tx.send(ChatEvent::MessagesChanged {
            event_id: event_id.to_string(),
        });
    }
}
