//! Conversation state: message log, active thread and request shaping.

pub mod exchange;
pub mod message;
pub mod request;
pub mod store;

pub use exchange::{ExchangeGuard, ExchangeOutcome, HttpReply, PendingExchange};
pub use message::{Message, Role};
pub use request::ChatKitRequest;
pub use store::ConversationStore;
