use thiserror::Error;

/// Errors surfaced by the chat core.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Input rejected before any storage effect: empty or oversized text,
    /// an unknown participant role, or a role claim contradicting the
    /// conversation's participant slots.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Write attempted against a conversation whose appointment has ended.
    #[error("conversation {0} is closed")]
    ConversationClosed(String),

    /// The underlying storage failed or was unreachable. No internal
    /// retries; callers may retry the whole operation.
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}
