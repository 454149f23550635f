//! One request/response round trip and its effect on the store.
//!
//! [`PendingExchange::begin`] records the user turn plus an empty assistant
//! placeholder; [`PendingExchange::settle`] consumes the exchange, so every
//! exchange ends in exactly one terminal outcome.

use serde::Serialize;
use tracing::{debug, warn};

use crate::common::config::ApiConfig;
use crate::common::errors::{ChatError, ChatResult};
use crate::common::ids::{ExchangeId, ThreadId};
use crate::decoder::{self, ResponseBody};

use super::message::Role;
use super::request::ChatKitRequest;
use super::store::ConversationStore;

/// Shown when the request never produced an HTTP reply.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
/// Shown for a failed reply without a server-provided detail message.
pub const SERVER_ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again.";
/// Shown when a successful reply carried no assistant text.
pub const EMPTY_REPLY_MESSAGE: &str = "I received your message but couldn't generate a response.";

/// HTTP reply handed back by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Reply body; `None` when missing or `null`.
    pub body: Option<ResponseBody>,
}

impl HttpReply {
    /// Build a reply.
    #[must_use]
    pub const fn new(status: u16, body: Option<ResponseBody>) -> Self {
        Self { status, body }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body to decode: present only on a 2xx reply whose body is not empty.
    #[must_use]
    pub fn decodable_body(&self) -> Option<&ResponseBody> {
        self.body
            .as_ref()
            .filter(|body| self.is_success() && !body.is_empty())
    }
}

/// How an exchange ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// The backend answered with text.
    Replied {
        /// Assistant text.
        text: String,
        /// Thread announced by the reply.
        thread_id: Option<ThreadId>,
    },
    /// The backend answered successfully but without text.
    EmptyReply {
        /// Thread announced by the reply.
        thread_id: Option<ThreadId>,
    },
    /// Non-2xx status or missing body.
    ServerError {
        /// HTTP status code.
        status: u16,
        /// User-facing message.
        message: String,
    },
    /// The request failed before any reply arrived.
    TransportFailed {
        /// Underlying error, for logs.
        error: String,
    },
}

impl ExchangeOutcome {
    /// Text the trailing assistant message shows for this outcome.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Replied { text, .. } => text,
            Self::EmptyReply { .. } => EMPTY_REPLY_MESSAGE,
            Self::ServerError { message, .. } => message,
            Self::TransportFailed { .. } => TRANSPORT_FAILURE_MESSAGE,
        }
    }

    /// Whether the backend produced assistant text.
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }
}

/// An exchange whose request has been built but whose reply is not applied yet.
#[derive(Debug)]
#[must_use = "an exchange must be settled exactly once"]
pub struct PendingExchange {
    id: ExchangeId,
    request: ChatKitRequest,
}

impl PendingExchange {
    /// Record the user turn and an empty assistant placeholder, and build the request.
    pub fn begin(store: &mut ConversationStore, user_text: &str, config: &ApiConfig) -> Self {
        let request = store.build_outgoing_request(user_text, config);
        store.append(Role::User, user_text);
        store.append(Role::Assistant, "");

        let id = ExchangeId::new();
        debug!(exchange = %id, kind = request.kind(), "exchange started");
        Self { id, request }
    }

    /// Correlation id of the exchange.
    #[must_use]
    pub const fn id(&self) -> ExchangeId {
        self.id
    }

    /// Request to send.
    #[must_use]
    pub const fn request(&self) -> &ChatKitRequest {
        &self.request
    }

    /// Apply the transport result to the store and finish the exchange.
    pub fn settle(self, store: &mut ConversationStore, reply: ChatResult<HttpReply>) -> ExchangeOutcome {
        self.apply(store, reply)
    }

    fn apply(&self, store: &mut ConversationStore, reply: ChatResult<HttpReply>) -> ExchangeOutcome {
        let outcome = match reply {
            Err(e) => {
                warn!(exchange = %self.id, error = %e, "request failed");
                ExchangeOutcome::TransportFailed {
                    error: e.to_string(),
                }
            }
            Ok(reply) => match reply.decodable_body() {
                Some(body) => {
                    let decoded = decoder::decode(body);
                    if let Some(thread_id) = &decoded.thread_id {
                        store.set_active_thread(thread_id.clone());
                    }
                    if decoded.has_text() {
                        ExchangeOutcome::Replied {
                            text: decoded.text,
                            thread_id: decoded.thread_id,
                        }
                    } else {
                        ExchangeOutcome::EmptyReply {
                            thread_id: decoded.thread_id,
                        }
                    }
                }
                None => {
                    let status = reply.status;
                    let message = reply
                        .body
                        .as_ref()
                        .and_then(ResponseBody::error_detail)
                        .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string());
                    warn!(exchange = %self.id, status, %message, "backend returned an error");
                    ExchangeOutcome::ServerError { status, message }
                }
            },
        };

        store.update_trailing_assistant_message(outcome.display_text());
        debug!(exchange = %self.id, reply = outcome.is_reply(), "exchange settled");
        outcome
    }
}

/// A pending exchange tied to its store while the request is in flight.
///
/// Dropping the guard before [`ExchangeGuard::settle`] (a cancelled future,
/// a client that went away) settles the exchange as a transport failure, so
/// the placeholder never stays empty.
#[must_use = "an exchange must be settled exactly once"]
pub struct ExchangeGuard<'a> {
    store: &'a mut ConversationStore,
    exchange: PendingExchange,
    settled: bool,
}

impl<'a> ExchangeGuard<'a> {
    /// Start an exchange on `store`; see [`PendingExchange::begin`].
    pub fn begin(store: &'a mut ConversationStore, user_text: &str, config: &ApiConfig) -> Self {
        let exchange = store.begin_exchange(user_text, config);
        Self {
            store,
            exchange,
            settled: false,
        }
    }

    /// Request to send.
    #[must_use]
    pub const fn request(&self) -> &ChatKitRequest {
        self.exchange.request()
    }

    /// Apply the transport result and finish the exchange.
    pub fn settle(mut self, reply: ChatResult<HttpReply>) -> ExchangeOutcome {
        self.settled = true;
        self.exchange.apply(self.store, reply)
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(exchange = %self.exchange.id(), "exchange dropped before a reply arrived");
            let _ = self.exchange.apply(self.store, Err(ChatError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SSE_REPLY: &str = concat!(
        "data: {\"type\":\"thread.created\",\"thread\":{\"id\":\"t1\"}}\n\n",
        "data: {\"type\":\"thread.item.done\",\"item\":{\"type\":\"assistant_message\",",
        "\"content\":[{\"type\":\"output_text\",\"text\":\"Hi there\"}]}}\n\n",
    );

    fn config() -> ApiConfig {
        ApiConfig::new("wf-1")
    }

    fn trailing(store: &ConversationStore) -> &str {
        store.last_message().map_or("", |m| m.content.as_str())
    }

    #[test]
    fn test_begin_appends_user_and_placeholder() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());

        assert_eq!(exchange.request().kind(), "threads.create");
        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0].role, Role::User);
        assert_eq!(store.messages()[0].content, "Hello");
        assert_eq!(store.messages()[1].role, Role::Assistant);
        assert_eq!(store.messages()[1].content, "");

        let _ = exchange.settle(&mut store, Ok(HttpReply::new(204, None)));
    }

    #[test]
    fn test_sse_reply_sets_thread_and_text() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let outcome = exchange.settle(
            &mut store,
            Ok(HttpReply::new(200, Some(ResponseBody::from(SSE_REPLY)))),
        );

        assert!(outcome.is_reply());
        assert_eq!(store.active_thread_id().map(ThreadId::as_str), Some("t1"));
        assert_eq!(trailing(&store), "Hi there");
    }

    #[test]
    fn test_server_error_uses_detail_message() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let body = ResponseBody::from(json!({"detail": {"message": "rate limited"}}));
        let outcome = exchange.settle(&mut store, Ok(HttpReply::new(500, Some(body))));

        assert_eq!(
            outcome,
            ExchangeOutcome::ServerError {
                status: 500,
                message: "rate limited".to_string(),
            }
        );
        assert_eq!(trailing(&store), "rate limited");
        assert_eq!(store.active_thread_id(), None);
    }

    #[test]
    fn test_server_error_without_detail_is_generic() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let body = ResponseBody::from("Bad Gateway");
        let outcome = exchange.settle(&mut store, Ok(HttpReply::new(502, Some(body))));

        assert_eq!(outcome.display_text(), SERVER_ERROR_MESSAGE);
        assert_eq!(trailing(&store), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_missing_body_on_success_is_an_error() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let outcome = exchange.settle(&mut store, Ok(HttpReply::new(200, None)));

        assert!(matches!(outcome, ExchangeOutcome::ServerError { status: 200, .. }));
        assert_eq!(trailing(&store), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_null_or_blank_body_on_success_is_an_error() {
        for body in [ResponseBody::from(json!(null)), ResponseBody::from("")] {
            let mut store = ConversationStore::new();
            let exchange = PendingExchange::begin(&mut store, "Hello", &config());
            let outcome = exchange.settle(&mut store, Ok(HttpReply::new(200, Some(body))));

            assert_eq!(
                outcome,
                ExchangeOutcome::ServerError {
                    status: 200,
                    message: SERVER_ERROR_MESSAGE.to_string(),
                }
            );
            assert_eq!(trailing(&store), SERVER_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_decodable_body_requires_success_and_content() {
        let body = ResponseBody::from(json!({"output": "hi"}));
        assert!(HttpReply::new(200, Some(body.clone())).decodable_body().is_some());
        assert!(HttpReply::new(299, Some(body.clone())).decodable_body().is_some());
        assert!(HttpReply::new(300, Some(body)).decodable_body().is_none());
        assert!(HttpReply::new(200, None).decodable_body().is_none());
    }

    #[test]
    fn test_guard_settles_once() {
        let mut store = ConversationStore::new();
        let guard = ExchangeGuard::begin(&mut store, "Hello", &config());
        assert_eq!(guard.request().kind(), "threads.create");
        let outcome = guard.settle(Ok(HttpReply::new(200, Some(ResponseBody::from(SSE_REPLY)))));

        assert!(outcome.is_reply());
        assert_eq!(trailing(&store), "Hi there");
    }

    #[test]
    fn test_dropped_guard_settles_as_transport_failure() {
        let mut store = ConversationStore::new();
        store.set_active_thread(ThreadId::new("t1").expect("valid id"));
        drop(ExchangeGuard::begin(&mut store, "Hello", &config()));

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0].content, "Hello");
        assert_eq!(trailing(&store), TRANSPORT_FAILURE_MESSAGE);
        assert_eq!(store.active_thread_id().map(ThreadId::as_str), Some("t1"));
    }

    #[test]
    fn test_empty_decode_keeps_thread_and_reports_no_response() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let body = ResponseBody::from(json!({"thread_id": "t7"}));
        let outcome = exchange.settle(&mut store, Ok(HttpReply::new(200, Some(body))));

        assert!(matches!(outcome, ExchangeOutcome::EmptyReply { .. }));
        assert_eq!(store.active_thread_id().map(ThreadId::as_str), Some("t7"));
        assert_eq!(trailing(&store), EMPTY_REPLY_MESSAGE);
    }

    #[test]
    fn test_transport_failure_leaves_thread_untouched() {
        let mut store = ConversationStore::new();
        store.set_active_thread(ThreadId::new("t1").expect("valid id"));
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let failure = ChatError::Io(std::io::Error::other("connection refused"));
        let outcome = exchange.settle(&mut store, Err(failure));

        assert!(matches!(outcome, ExchangeOutcome::TransportFailed { .. }));
        assert_eq!(store.active_thread_id().map(ThreadId::as_str), Some("t1"));
        assert_eq!(trailing(&store), TRANSPORT_FAILURE_MESSAGE);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_first_exchange_retries_thread_creation() {
        let mut store = ConversationStore::new();
        let exchange = PendingExchange::begin(&mut store, "Hello", &config());
        let _ = exchange.settle(&mut store, Ok(HttpReply::new(503, None)));

        let retry = PendingExchange::begin(&mut store, "Hello again", &config());
        assert_eq!(retry.request().kind(), "threads.create");
        let _ = retry.settle(&mut store, Ok(HttpReply::new(503, None)));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = ExchangeOutcome::Replied {
            text: "hi".to_string(),
            thread_id: ThreadId::new("t1").ok(),
        };
        let value = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(value, json!({"outcome": "replied", "text": "hi", "thread_id": "t1"}));
    }
}
