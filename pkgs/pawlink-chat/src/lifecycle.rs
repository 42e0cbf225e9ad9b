//! Lifecycle guard - OPEN/CLOSED state machine over the conversation record
//!
//! Driven by the external appointment scheduler: `close` when an appointment
//! concludes or is cancelled, `reopen` for corrections. The guard owns no
//! storage of its own; it reads and writes the status fields of the
//! conversation row.

use crate::conversation_registry::fetch_conversation;
use crate::entities::conversations;
use crate::error::ChatError;
use crate::events::ChatEvents;
use crate::types::ConversationStatus;
use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};

/// Lifecycle guard
pub struct LifecycleGuard {
    db: DatabaseConnection,
    events: ChatEvents,
}

impl LifecycleGuard {
    /// Create a guard over an existing database connection
    pub fn with_connection(db: DatabaseConnection, events: ChatEvents) -> Self {
        Self { db, events }
    }

    /// Transition OPEN -> CLOSED and stamp `closed_at`. Idempotent: closing
    /// an already-closed conversation is a no-op, as is closing an event
    /// whose chat nobody ever opened.
    pub async fn close(&self, event_id: &str) -> Result<(), ChatError> {
        let Some(model) = fetch_conversation(&self.db, event_id).await? else {
            debug!("Close requested for never-opened conversation {}", event_id);
            return Ok(());
        };

        if model.status == ConversationStatus::Closed.as_str() {
            return Ok(());
        }

        let now = Utc::now().timestamp_millis();
        let mut active: conversations::ActiveModel = model.into();
        active.status = Set(ConversationStatus::Closed.as_str().to_string());
        active.closed_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        info!("Closed conversation {}", event_id);
        self.events.conversation_changed(event_id);
        Ok(())
    }

    /// Transition CLOSED -> OPEN and clear `closed_at`. Idempotent.
    pub async fn reopen(&self, event_id: &str) -> Result<(), ChatError> {
        let Some(model) = fetch_conversation(&self.db, event_id).await? else {
            debug!("Reopen requested for never-opened conversation {}", event_id);
            return Ok(());
        };

        if model.status == ConversationStatus::Open.as_str() {
            return Ok(());
        }

        let mut active: conversations::ActiveModel = model.into();
        active.status = Set(ConversationStatus::Open.as_str().to_string());
        active.closed_at = Set(None);
        active.updated_at = Set(Utc::now().timestamp_millis());
        active.update(&self.db).await?;

        info!("Reopened conversation {}", event_id);
        self.events.conversation_changed(event_id);
        Ok(())
    }

    /// Fail with [`ChatError::ConversationClosed`] iff the conversation
    /// exists and is CLOSED. An absent conversation is writable: the first
    /// append will lazily create it.
    ///
    /// This is a plain read-then-act check; a close racing a concurrent
    /// append can let one last message through.
    pub async fn assert_writable(&self, event_id: &str) -> Result<(), ChatError> {
        match fetch_conversation(&self.db, event_id).await? {
            Some(model) if model.status == ConversationStatus::Closed.as_str() => {
                Err(ChatError::ConversationClosed(event_id.to_string()))
            }
            _ => Ok(()),
        }
    }
}
