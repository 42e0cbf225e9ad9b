//! Message log - append-only ordered message storage per conversation

use crate::conversation_registry::fetch_conversation;
use crate::entities::{conversations, messages};
use crate::error::ChatError;
use crate::events::ChatEvents;
use crate::lifecycle::LifecycleGuard;
use crate::types::{ChatMessage, ConversationStatus, ParticipantRole};
use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};
use uuid::Uuid;

/// Fetch a conversation's messages in canonical order: ascending creation
/// time, message id as tiebreak.
pub(crate) async fn fetch_ordered(
    db: &DatabaseConnection,
    event_id: &str,
) -> Result<Vec<ChatMessage>, ChatError> {
    let msgs = messages::Entity::find()
        .filter(messages::Column::ConversationId.eq(event_id))
        .order_by_asc(messages::Column::CreatedAt)
        .order_by_asc(messages::Column::Id)
        .all(db)
        .await?;

    msgs.into_iter().map(ChatMessage::from_model).collect()
}

/// Message log
pub struct MessageLog {
    db: DatabaseConnection,
    events: ChatEvents,
    guard: LifecycleGuard,
    max_text_len: usize,
}

impl MessageLog {
    /// Create a message log over an existing database connection
    pub fn with_connection(db: DatabaseConnection, events: ChatEvents, max_text_len: usize) -> Self {
        let guard = LifecycleGuard::with_connection(db.clone(), events.clone());
        Self {
            db,
            events,
            guard,
            max_text_len,
        }
    }

    /// Append a message to a conversation and return its id.
    ///
    /// Validation runs before any storage effect, so a rejected append never
    /// materializes a conversation. A valid append into an event whose chat
    /// does not exist yet lazily creates the conversation as OPEN with both
    /// participant slots empty.
    pub async fn append(
        &self,
        event_id: &str,
        sender_id: &str,
        sender_role: ParticipantRole,
        text: &str,
    ) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Validation("message text is empty".to_string()));
        }
        if text.chars().count() > self.max_text_len {
            return Err(ChatError::Validation(format!(
                "message text exceeds {} characters",
                self.max_text_len
            )));
        }

        self.guard.assert_writable(event_id).await?;
        let conversation = self.ensure_conversation(event_id).await?;

        // A filled slot pins the role to one participant; an empty slot
        // still trusts the caller's claim.
        let claimed_slot = match sender_role {
            ParticipantRole::Owner => &conversation.owner_participant_id,
            ParticipantRole::Vet => &conversation.vet_participant_id,
        };
        if let Some(expected) = claimed_slot {
            if expected != sender_id {
                return Err(ChatError::Validation(format!(
                    "sender {sender_id} does not hold the {sender_role} slot of conversation {event_id}"
                )));
            }
        }

        let id = Uuid::now_v7().to_string();
        let new_msg = messages::ActiveModel {
            id: Set(id.clone()),
            conversation_id: Set(event_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            sender_role: Set(sender_role.as_str().to_string()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().timestamp_millis()),
            read: Set(false),
            read_at: Set(None),
        };
        new_msg.insert(&self.db).await?;

        debug!("Appended message {} to conversation {}", id, event_id);
        self.events.messages_changed(event_id);
        Ok(id)
    }

    /// All messages of a conversation in ascending creation order. This
    /// sequence is the canonical read model.
    pub async fn list_ordered(&self, event_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        fetch_ordered(&self.db, event_id).await
    }

    /// Mark the identified messages as read. Best-effort: ids that do not
    /// exist or are already read are silently skipped, so repeated calls
    /// are harmless.
    pub async fn mark_read(&self, event_id: &str, message_ids: &[String]) -> Result<(), ChatError> {
        if message_ids.is_empty() {
            return Ok(());
        }

        let unread = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(event_id))
            .filter(messages::Column::Id.is_in(message_ids.iter().map(String::as_str)))
            .filter(messages::Column::Read.eq(false))
            .all(&self.db)
            .await?;

        if unread.is_empty() {
            return Ok(());
        }

        let now = Utc::now().timestamp_millis();
        let count = unread.len();
        for model in unread {
            let mut active: messages::ActiveModel = model.into();
            active.read = Set(true);
            active.read_at = Set(Some(now));
            active.update(&self.db).await?;
        }

        debug!("Marked {} messages read in conversation {}", count, event_id);
        self.events.messages_changed(event_id);
        Ok(())
    }

    /// Number of unread messages in a conversation
    pub async fn unread_count(&self, event_id: &str) -> Result<u64, ChatError> {
        let count = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(event_id))
            .filter(messages::Column::Read.eq(false))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn ensure_conversation(
        &self,
        event_id: &str,
    ) -> Result<conversations::Model, ChatError> {
        if let Some(model) = fetch_conversation(&self.db, event_id).await? {
            return Ok(model);
        }

        let now = Utc::now().timestamp_millis();
        let new_conv = conversations::ActiveModel {
            event_id: Set(event_id.to_string()),
            owner_participant_id: Set(None),
            vet_participant_id: Set(None),
            status: Set(ConversationStatus::Open.as_str().to_string()),
            created_at: Set(now),
            closed_at: Set(None),
            updated_at: Set(now),
        };

        match new_conv.insert(&self.db).await {
            Ok(model) => {
                info!("Conversation {} materialized by first message", event_id);
                self.events.conversation_changed(event_id);
                Ok(model)
            }
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                fetch_conversation(&self.db, event_id).await?.ok_or_else(|| {
                    ChatError::Storage(DbErr::Custom(format!(
                        "conversation {event_id} missing after concurrent insert"
                    )))
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
