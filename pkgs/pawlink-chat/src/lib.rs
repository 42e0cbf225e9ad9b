//! PawLink Chat - appointment-scoped chat for pet-health applications
//!
//! This crate provides the conversation and message layer behind PawLink's
//! appointment chat: one conversation per scheduled appointment, two
//! role-scoped participants (pet owner and veterinarian), an open/closed
//! lifecycle gating writes, and live snapshot subscriptions for chat screens.
//!
//! # Architecture
//!
//! The crate is organized into four components sharing one SQLite database
//! and one in-process event hub:
//!
//! - **ConversationRegistry**: one conversation per appointment event,
//!   idempotent creation, participant slot fill-in
//! - **MessageLog**: append-only ordered message storage, read flags
//! - **LifecycleGuard**: OPEN/CLOSED state machine, rejects writes to
//!   closed conversations
//! - **SyncChannel**: snapshot subscriptions pushed to chat screens on
//!   every conversation or message change
//!
//! [`ChatStore`] wires all four up over a single connection.
//!
//! # Database Schema
//!
//! Sea-ORM over SQLite with two tables:
//!
//! - `conversations`: keyed by appointment event id; participant slots,
//!   status, lifecycle timestamps
//! - `messages`: keyed by a time-ordered UUID; sender, role, text,
//!   creation timestamp, read flag
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pawlink_chat::{ChatConfig, ChatStore, ParticipantRole};
//!
//! # async fn example() -> Result<(), pawlink_chat::ChatError> {
//! let store = ChatStore::open(ChatConfig {
//!     db_path: "pawlink-chat.db".into(),
//!     ..Default::default()
//! })
//! .await?;
//!
//! store
//!     .registry()
//!     .open_or_create("evt-1001", Some("owner-42"), None)
//!     .await?;
//!
//! store
//!     .messages()
//!     .append("evt-1001", "owner-42", ParticipantRole::Owner, "Hello doctor")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod chat_store;
pub mod conversation_registry;
pub mod entities;
pub mod error;
pub mod lifecycle;
pub mod message_log;
pub mod migration;
pub mod sync_channel;
pub mod types;

mod events;

pub use chat_store::ChatStore;
pub use conversation_registry::ConversationRegistry;
pub use error::ChatError;
pub use events::{ChatEvent, ChatEvents};
pub use lifecycle::LifecycleGuard;
pub use message_log::MessageLog;
pub use sync_channel::{Subscription, SyncChannel};
pub use types::{ChatMessage, Conversation, ConversationStatus, ParticipantRole};

/// Configuration for the chat store
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Path to the SQLite database file
    pub db_path: std::path::PathBuf,

    /// Buffer capacity of the change-notification channel (default: 64)
    pub event_buffer: usize,

    /// Maximum message text length in characters, re-checked on append
    /// (default: 500, matching the client-side bound)
    pub max_text_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            db_path: std::path::PathBuf::from("pawlink-chat.db"),
            event_buffer: 64,
            max_text_len: 500,
        }
    }
}
