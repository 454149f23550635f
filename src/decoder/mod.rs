//! Response decoding for ChatKit replies.
//!
//! A reply body is either an SSE text stream or a single JSON value. Both are
//! reduced to a [`DecodeResult`] holding the thread identifier (if any) and
//! the assistant text. Decoding is total: malformed or unexpected input only
//! ever produces an emptier result.

pub mod event;
mod extract;
pub mod sse;

pub use event::{DecodedEvent, ItemRole};

use serde::Serialize;
use serde_json::Value;

use crate::common::ids::ThreadId;

/// Raw body of an HTTP reply, as handed over by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseBody {
    /// Textual body, decoded as an SSE stream.
    Text(String),
    /// Structured JSON body.
    Json(Value),
}

impl ResponseBody {
    /// Classify a raw body.
    ///
    /// Blank text and JSON `null` count as no body. Text that parses as JSON
    /// is structured; everything else is kept as text.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Null) => None,
            Ok(value) => Some(Self::Json(value)),
            Err(_) => Some(Self::Text(raw)),
        }
    }

    /// Whether the body carries nothing: blank text, a blank JSON string or
    /// JSON `null`.
    ///
    /// Such a body is treated like a missing one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => text.trim().is_empty(),
            Self::Json(value) => value.is_null(),
        }
    }

    /// Server-provided error detail (`detail.message`), if any.
    #[must_use]
    pub fn error_detail(&self) -> Option<String> {
        let parsed;
        let value = match self {
            Self::Json(value) => value,
            Self::Text(text) => {
                parsed = serde_json::from_str::<Value>(text).ok()?;
                &parsed
            }
        };
        event::non_empty_str(value.pointer("/detail/message")).map(str::to_string)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Normalized outcome of decoding one reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DecodeResult {
    /// Thread announced by the reply.
    pub thread_id: Option<ThreadId>,
    /// Concatenated assistant text, in arrival order.
    pub text: String,
}

impl DecodeResult {
    /// Whether the reply produced any text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Fold one stream event into the result.
    pub(crate) fn apply(&mut self, event: DecodedEvent) {
        match event {
            DecodedEvent::ThreadCreated { thread_id } => self.thread_id = Some(thread_id),
            DecodedEvent::ItemDone {
                role: ItemRole::Assistant,
                text_fragments,
            } => {
                for fragment in text_fragments {
                    self.text.push_str(&fragment);
                }
            }
            DecodedEvent::ItemUpdated { text_fragment } => self.text.push_str(&text_fragment),
            DecodedEvent::ItemDone { .. } | DecodedEvent::Unrecognized => {}
        }
    }
}

/// Decode a reply body. Never fails.
#[must_use]
pub fn decode(body: &ResponseBody) -> DecodeResult {
    match body {
        ResponseBody::Text(text) => sse::decode_stream(text),
        ResponseBody::Json(value) => decode_value(value),
    }
}

/// Decode a reply that was already parsed as JSON.
///
/// A JSON string is treated as SSE text; objects and arrays go through the
/// structured fallback chain; other scalars decode to nothing.
#[must_use]
pub fn decode_value(value: &Value) -> DecodeResult {
    match value {
        Value::String(text) => sse::decode_stream(text),
        Value::Object(_) | Value::Array(_) => extract::decode_object(value),
        Value::Null | Value::Bool(_) | Value::Number(_) => DecodeResult::default(),
    }
}
