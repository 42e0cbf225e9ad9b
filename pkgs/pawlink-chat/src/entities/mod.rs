//! Sea-ORM entities for pawlink-chat

pub mod conversations;
pub mod messages;

pub use conversations::Entity as Conversation;
pub use messages::Entity as Message;
