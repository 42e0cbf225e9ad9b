//! Conversation registry - one conversation per appointment event

use crate::entities::{conversations, messages};
use crate::error::ChatError;
use crate::events::ChatEvents;
use crate::types::{Conversation, ConversationStatus};
use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};

/// Fetch the raw conversation row for an event, if any.
pub(crate) async fn fetch_conversation(
    db: &DatabaseConnection,
    event_id: &str,
) -> Result<Option<conversations::Model>, ChatError> {
    let conv = conversations::Entity::find()
        .filter(conversations::Column::EventId.eq(event_id))
        .one(db)
        .await?;

    Ok(conv)
}

/// Conversation registry
pub struct ConversationRegistry {
    db: DatabaseConnection,
    events: ChatEvents,
}

impl ConversationRegistry {
    /// Create a registry over an existing database connection
    pub fn with_connection(db: DatabaseConnection, events: ChatEvents) -> Self {
        Self { db, events }
    }

    /// Fetch the conversation for an event, creating it as OPEN if absent.
    ///
    /// Idempotent. Participant slots follow fill-if-null semantics: a
    /// supplied id fills an empty slot (on the existing record too), a slot
    /// that is already set is never overwritten.
    pub async fn open_or_create(
        &self,
        event_id: &str,
        owner_participant_id: Option<&str>,
        vet_participant_id: Option<&str>,
    ) -> Result<Conversation, ChatError> {
        if let Some(model) = fetch_conversation(&self.db, event_id).await? {
            return self
                .fill_participant_slots(model, owner_participant_id, vet_participant_id)
                .await;
        }

        let now = Utc::now().timestamp_millis();
        let new_conv = conversations::ActiveModel {
            event_id: Set(event_id.to_string()),
            owner_participant_id: Set(owner_participant_id.map(str::to_string)),
            vet_participant_id: Set(vet_participant_id.map(str::to_string)),
            status: Set(ConversationStatus::Open.as_str().to_string()),
            created_at: Set(now),
            closed_at: Set(None),
            updated_at: Set(now),
        };

        match new_conv.insert(&self.db).await {
            Ok(model) => {
                info!("Created conversation for event {}", event_id);
                self.events.conversation_changed(event_id);
                Conversation::from_model(model)
            }
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                // Another caller created it concurrently; fill slots on the
                // record that won instead.
                let model = fetch_conversation(&self.db, event_id).await?.ok_or_else(|| {
                    ChatError::Storage(DbErr::Custom(format!(
                        "conversation {event_id} missing after concurrent insert"
                    )))
                })?;
                self.fill_participant_slots(model, owner_participant_id, vet_participant_id)
                    .await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the conversation for an event. Returns `Ok(None)` if the chat was
    /// never opened; no side effects.
    pub async fn get(&self, event_id: &str) -> Result<Option<Conversation>, ChatError> {
        fetch_conversation(&self.db, event_id)
            .await?
            .map(Conversation::from_model)
            .transpose()
    }

    /// All conversations, newest first
    pub async fn list(&self) -> Result<Vec<Conversation>, ChatError> {
        let convs = conversations::Entity::find()
            .order_by_desc(conversations::Column::CreatedAt)
            .all(&self.db)
            .await?;

        convs.into_iter().map(Conversation::from_model).collect()
    }

    /// Delete a conversation and every message it owns
    pub async fn delete(&self, event_id: &str) -> Result<(), ChatError> {
        messages::Entity::delete_many()
            .filter(messages::Column::ConversationId.eq(event_id))
            .exec(&self.db)
            .await?;

        conversations::Entity::delete_many()
            .filter(conversations::Column::EventId.eq(event_id))
            .exec(&self.db)
            .await?;

        info!("Deleted conversation {} and its messages", event_id);
        self.events.messages_changed(event_id);
        self.events.conversation_changed(event_id);
        Ok(())
    }

    async fn fill_participant_slots(
        &self,
        model: conversations::Model,
        owner_participant_id: Option<&str>,
        vet_participant_id: Option<&str>,
    ) -> Result<Conversation, ChatError> {
        let fill_owner = model.owner_participant_id.is_none() && owner_participant_id.is_some();
        let fill_vet = model.vet_participant_id.is_none() && vet_participant_id.is_some();

        if !fill_owner && !fill_vet {
            return Conversation::from_model(model);
        }

        let mut active: conversations::ActiveModel = model.into();
        if fill_owner {
            active.owner_participant_id = Set(owner_participant_id.map(str::to_string));
        }
        if fill_vet {
            active.vet_participant_id = Set(vet_participant_id.map(str::to_string));
        }
        active.updated_at = Set(Utc::now().timestamp_millis());

        let updated = active.update(&self.db).await?;
        debug!("Filled participant slots on conversation {}", updated.event_id);
        self.events.conversation_changed(&updated.event_id);
        Conversation::from_model(updated)
    }
}
