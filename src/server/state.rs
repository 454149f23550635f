//! Application state shared across all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::common::config::ApiConfig;
use crate::common::errors::ChatResult;
use crate::session::ChatSession;

/// Shared application state.
pub struct AppState {
    /// The relayed conversation. Held for the whole exchange, so a locked
    /// session means a reply is still pending.
    pub session: Mutex<ChatSession>,
}

impl AppState {
    /// Create state with an HTTP session to the configured backend.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> ChatResult<Arc<Self>> {
        Ok(Self::with_session(ChatSession::connect(config)?))
    }

    /// Create state around an existing session.
    #[must_use]
    pub fn with_session(session: ChatSession) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
        })
    }
}
