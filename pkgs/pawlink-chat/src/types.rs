//! Domain types shared by the chat components

use crate::entities::{conversations, messages};
use crate::error::ChatError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationStatus {
    Open,
    Closed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Open => "Open",
            ConversationStatus::Closed => "Closed",
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(ConversationStatus::Open),
            "Closed" => Ok(ConversationStatus::Closed),
            other => Err(ChatError::Validation(format!(
                "unknown conversation status: {other}"
            ))),
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Owner,
    Vet,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Owner => "Owner",
            ParticipantRole::Vet => "Vet",
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("owner") {
            Ok(ParticipantRole::Owner)
        } else if s.eq_ignore_ascii_case("vet") {
            Ok(ParticipantRole::Vet)
        } else {
            Err(ChatError::Validation(format!(
                "unknown participant role: {s}"
            )))
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation bound 1:1 to a scheduled appointment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub event_id: String,
    pub owner_participant_id: Option<String>,
    pub vet_participant_id: Option<String>,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_open(&self) -> bool {
        self.status == ConversationStatus::Open
    }

    pub(crate) fn from_model(model: conversations::Model) -> Result<Self, ChatError> {
        Ok(Self {
            status: model.status.parse()?,
            event_id: model.event_id,
            owner_participant_id: model.owner_participant_id,
            vet_participant_id: model.vet_participant_id,
            created_at: DateTime::from_timestamp_millis(model.created_at).unwrap_or_default(),
            closed_at: model.closed_at.and_then(DateTime::from_timestamp_millis),
        })
    }
}

/// One timestamped, role-attributed text entry within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_role: ParticipantRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub(crate) fn from_model(model: messages::Model) -> Result<Self, ChatError> {
        Ok(Self {
            sender_role: model.sender_role.parse()?,
            id: model.id,
            conversation_id: model.conversation_id,
            sender_id: model.sender_id,
            text: model.text,
            created_at: DateTime::from_timestamp_millis(model.created_at).unwrap_or_default(),
            read: model.read,
            read_at: model.read_at.and_then(DateTime::from_timestamp_millis),
        })
    }
}
