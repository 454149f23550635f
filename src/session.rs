//! Sequential chat session driving exchanges through a transport.

use std::sync::Arc;

use tracing::info;

use crate::common::config::ApiConfig;
use crate::common::errors::{ChatError, ChatResult};
use crate::conversation::exchange::{ExchangeGuard, ExchangeOutcome};
use crate::conversation::store::ConversationStore;
use crate::transport::{HttpTransport, Transport};

/// One conversation bound to a backend.
///
/// `send` borrows the session mutably for the whole round trip, so a second
/// exchange cannot start before the first one is settled.
pub struct ChatSession {
    config: ApiConfig,
    store: ConversationStore,
    transport: Arc<dyn Transport>,
}

impl ChatSession {
    /// Create a session over an arbitrary transport.
    #[must_use]
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            store: ConversationStore::new(),
            transport,
        }
    }

    /// Create a session talking HTTP to the configured backend.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the HTTP client cannot be built.
    pub fn connect(config: ApiConfig) -> ChatResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        info!(endpoint = %transport.endpoint(), workflow = %config.workflow_name, "chat session ready");
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Conversation state.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Backend configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one user message and apply the reply.
    ///
    /// Transport and backend failures are reported through the returned
    /// outcome (and the trailing assistant message), not as errors. If the
    /// returned future is dropped mid-flight, the exchange is settled as a
    /// transport failure.
    ///
    /// # Errors
    /// Returns `ChatError::EmptyInput` if the message is blank.
    pub async fn send(&mut self, input: &str) -> ChatResult<ExchangeOutcome> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let exchange = ExchangeGuard::begin(&mut self.store, text, &self.config);
        let reply = self.transport.send(exchange.request()).await;
        Ok(exchange.settle(reply))
    }

    /// Drop the conversation and start over without a thread.
    pub fn clear(&mut self) {
        self.store.reset();
        info!("conversation cleared");
    }
}
