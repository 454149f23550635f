//! In-memory conversation log with its active thread.

use chrono::Utc;
use tracing::info;

use crate::common::config::ApiConfig;
use crate::common::ids::{MessageId, ThreadId};

use super::exchange::PendingExchange;
use super::message::{Message, Role};
use super::request::ChatKitRequest;

/// Ordered message log plus the backend thread it belongs to.
///
/// The store itself does no locking: at most one exchange may be in flight
/// per store, and the caller is responsible for enforcing that.
#[derive(Clone, Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    active_thread_id: Option<ThreadId>,
}

impl ConversationStore {
    /// Create an empty store with no active thread.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently appended message.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Thread reused by every outgoing request, once the backend created one.
    #[must_use]
    pub const fn active_thread_id(&self) -> Option<&ThreadId> {
        self.active_thread_id.as_ref()
    }

    /// Number of messages in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a new message and return it.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let now = Utc::now();
        let created_at = self
            .messages
            .last()
            .map_or(now, |last| last.created_at.max(now));

        self.messages.push(Message {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Replace the content of the trailing message if it is an assistant message.
    ///
    /// Returns `false` (and changes nothing) when the log is empty or ends
    /// with a user message.
    pub fn update_trailing_assistant_message(&mut self, content: impl Into<String>) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.is_assistant() => {
                last.content = content.into();
                true
            }
            _ => false,
        }
    }

    /// Make `thread_id` the active thread.
    pub fn set_active_thread(&mut self, thread_id: ThreadId) {
        if self.active_thread_id.as_ref() != Some(&thread_id) {
            info!(thread_id = %thread_id, "active thread set");
        }
        self.active_thread_id = Some(thread_id);
    }

    /// Clear the log and the active thread together.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.active_thread_id = None;
    }

    /// Request for the next user turn, shaped by the current thread state.
    #[must_use]
    pub fn build_outgoing_request(&self, user_text: &str, config: &ApiConfig) -> ChatKitRequest {
        ChatKitRequest::for_thread(self.active_thread_id.as_ref(), user_text, config)
    }

    /// Start an exchange for `user_text`; see [`PendingExchange::begin`].
    pub fn begin_exchange(&mut self, user_text: &str, config: &ApiConfig) -> PendingExchange {
        PendingExchange::begin(self, user_text, config)
    }
}
