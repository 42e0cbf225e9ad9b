//! Chat store - wires the chat components over one database connection

use crate::conversation_registry::ConversationRegistry;
use crate::error::ChatError;
use crate::events::ChatEvents;
use crate::lifecycle::LifecycleGuard;
use crate::message_log::MessageLog;
use crate::sync_channel::SyncChannel;
use crate::ChatConfig;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Chat store - the four chat components sharing one SQLite database and
/// one change-notification hub
pub struct ChatStore {
    registry: ConversationRegistry,
    messages: MessageLog,
    lifecycle: LifecycleGuard,
    sync: SyncChannel,
}

impl ChatStore {
    /// Open (creating if needed) the SQLite database at the configured
    /// path, run migrations, and build the components.
    pub async fn open(config: ChatConfig) -> Result<Self, ChatError> {
        let db_path_str = config
            .db_path
            .to_str()
            .ok_or_else(|| ChatError::Validation("database path is not valid UTF-8".to_string()))?
            .replace('\\', "/");

        let db_url = format!("sqlite:{}?mode=rwc", db_path_str);

        let db: DatabaseConnection = Database::connect(db_url.as_str()).await?;

        crate::migration::Migrator::up(&db, None).await?;

        info!("Chat store initialized at {}", config.db_path.display());

        Ok(Self::with_connection(db, config))
    }

    /// Build the components over an existing database connection. The
    /// caller is responsible for having run migrations.
    pub fn with_connection(db: DatabaseConnection, config: ChatConfig) -> Self {
        let events = ChatEvents::new(config.event_buffer);

        Self {
            registry: ConversationRegistry::with_connection(db.clone(), events.clone()),
            messages: MessageLog::with_connection(db.clone(), events.clone(), config.max_text_len),
            lifecycle: LifecycleGuard::with_connection(db.clone(), events.clone()),
            sync: SyncChannel::with_connection(db, events),
        }
    }

    /// Conversation registry: open/create/get conversations per event
    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    /// Message log: append, list, read flags
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Lifecycle guard: close/reopen, driven by the appointment scheduler
    pub fn lifecycle(&self) -> &LifecycleGuard {
        &self.lifecycle
    }

    /// Live sync channel: snapshot subscriptions for chat screens
    pub fn sync(&self) -> &SyncChannel {
        &self.sync
    }
}
