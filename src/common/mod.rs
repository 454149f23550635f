//! Shared configuration, error and identifier types.

pub mod config;
pub mod errors;
pub mod ids;

pub use config::ApiConfig;
pub use errors::{ChatError, ChatResult};
pub use ids::{ExchangeId, MessageId, ThreadId};
