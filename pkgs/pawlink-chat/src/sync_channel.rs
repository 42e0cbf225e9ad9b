//! Live sync channel - pushes conversation and message snapshots to
//! subscribed chat screens
//!
//! Subscribers register a callback and get the current snapshot immediately,
//! then again after every persisted change. Each notification carries the
//! whole ordered state, not a diff. Snapshot read failures are logged and
//! swallowed: a flaky store degrades to "no updates" instead of crashing
//! the screen.

use crate::conversation_registry::fetch_conversation;
use crate::events::{ChatEvent, ChatEvents};
use crate::message_log::fetch_ordered;
use crate::types::{ChatMessage, Conversation};
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

/// Cancellation handle for a live subscription.
///
/// `unsubscribe` stops delivery and is safe to call any number of times.
/// Dropping the handle also cancels the subscription.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Live sync channel
pub struct SyncChannel {
    db: DatabaseConnection,
    events: ChatEvents,
}

impl SyncChannel {
    /// Create a sync channel over an existing database connection
    pub fn with_connection(db: DatabaseConnection, events: ChatEvents) -> Self {
        Self { db, events }
    }

    /// Watch one conversation record. The callback fires with the current
    /// record as soon as it exists (immediately, if it already does) and
    /// again on every mutation: participant fill-in, close, reopen.
    pub fn subscribe_conversation<F>(&self, event_id: &str, on_change: F) -> Subscription
    where
        F: Fn(Conversation) + Send + Sync + 'static,
    {
        // Register with the hub before the initial read so no change
        // between the two is missed.
        let mut rx = self.events.subscribe();
        let db = self.db.clone();
        let event_id = event_id.to_string();

        let handle = tokio::spawn(async move {
            deliver_conversation(&db, &event_id, &on_change).await;
            loop {
                match rx.recv().await {
                    Ok(ChatEvent::ConversationChanged { event_id: id }) if id == event_id => {
                        deliver_conversation(&db, &event_id, &on_change).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // Snapshots make lag harmless: re-read once
                        deliver_conversation(&db, &event_id, &on_change).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { handle }
    }

    /// Watch one conversation's message log. The callback fires with the
    /// full ordered list on subscribe (empty if no messages yet) and after
    /// every append or read-flag change.
    pub fn subscribe_messages<F>(&self, event_id: &str, on_change: F) -> Subscription
    where
        F: Fn(Vec<ChatMessage>) + Send + Sync + 'static,
    {
        let mut rx = self.events.subscribe();
        let db = self.db.clone();
        let event_id = event_id.to_string();

        let handle = tokio::spawn(async move {
            deliver_messages(&db, &event_id, &on_change).await;
            loop {
                match rx.recv().await {
                    Ok(ChatEvent::MessagesChanged { event_id: id }) if id == event_id => {
                        deliver_messages(&db, &event_id, &on_change).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        deliver_messages(&db, &event_id, &on_change).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { handle }
    }
}

async fn deliver_conversation<F>(db: &DatabaseConnection, event_id: &str, on_change: &F)
where
    F: Fn(Conversation),
{
    match fetch_conversation(db, event_id).await.and_then(|found| {
        found.map(Conversation::from_model).transpose()
    }) {
        Ok(Some(conversation)) => on_change(conversation),
        Ok(None) => {}
        Err(e) => warn!(
            "Skipping conversation update for subscriber of {}: {}",
            event_id, e
        ),
    }
}

async fn deliver_messages<F>(db: &DatabaseConnection, event_id: &str, on_change: &F)
where
    F: Fn(Vec<ChatMessage>),
{
    match fetch_ordered(db, event_id).await {
        Ok(messages) => on_change(messages),
        Err(e) => {
            warn!(
                "Failed to read messages for subscriber of {}: {}",
                event_id, e
            );
            on_change(Vec::new());
        }
    }
}
