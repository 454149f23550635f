//! ChatKit stream event vocabulary.
//!
//! Events are classified from loosely-typed JSON so that a shape mismatch in
//! one field degrades to [`DecodedEvent::Unrecognized`] instead of failing.

use serde_json::Value;

use crate::common::ids::ThreadId;

/// Event type announcing a newly created thread.
pub const THREAD_CREATED: &str = "thread.created";
/// Event type carrying a completed thread item.
pub const THREAD_ITEM_DONE: &str = "thread.item.done";
/// Event type carrying an incremental item update.
pub const THREAD_ITEM_UPDATED: &str = "thread.item.updated";

/// Item type of an assistant reply.
const ASSISTANT_MESSAGE: &str = "assistant_message";
/// Item type of a user message echoed back by the backend.
const USER_MESSAGE: &str = "user_message";
/// Content block type holding model output.
const OUTPUT_TEXT: &str = "output_text";
/// Update type appending a content part to an item.
const CONTENT_PART_ADDED: &str = "content_part_added";

/// Author of a thread item, as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemRole {
    /// An `assistant_message` item.
    Assistant,
    /// A `user_message` item.
    User,
    /// Any other (or missing) item type.
    Other(String),
}

impl ItemRole {
    fn from_item_type(item_type: Option<&str>) -> Self {
        match item_type {
            Some(ASSISTANT_MESSAGE) => Self::Assistant,
            Some(USER_MESSAGE) => Self::User,
            other => Self::Other(other.unwrap_or_default().to_string()),
        }
    }
}

/// One event of a decoded response stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedEvent {
    /// The backend created a thread.
    ThreadCreated {
        /// Identifier of the new thread.
        thread_id: ThreadId,
    },
    /// A thread item finished.
    ItemDone {
        /// Author of the item.
        role: ItemRole,
        /// Output text blocks, in block order.
        text_fragments: Vec<String>,
    },
    /// A content part was appended to an item.
    ItemUpdated {
        /// Text of the appended part.
        text_fragment: String,
    },
    /// Anything else, including known types missing their payload.
    Unrecognized,
}

impl DecodedEvent {
    /// Classify a parsed event object.
    #[must_use]
    pub fn from_value(event: &Value) -> Self {
        match str_field(event, "type") {
            Some(THREAD_CREATED) => event
                .get("thread")
                .and_then(|thread| non_empty_str(thread.get("id")))
                .and_then(|id| ThreadId::new(id).ok())
                .map_or(Self::Unrecognized, |thread_id| Self::ThreadCreated { thread_id }),
            Some(THREAD_ITEM_DONE) => match event.get("item") {
                Some(item) if item.is_object() => Self::ItemDone {
                    role: ItemRole::from_item_type(str_field(item, "type")),
                    text_fragments: output_text_fragments(item),
                },
                _ => Self::Unrecognized,
            },
            Some(THREAD_ITEM_UPDATED) => event
                .get("update")
                .filter(|update| str_field(update, "type") == Some(CONTENT_PART_ADDED))
                .and_then(|update| update.get("part"))
                .and_then(|part| non_empty_str(part.get("text")))
                .map_or(Self::Unrecognized, |text| Self::ItemUpdated {
                    text_fragment: text.to_string(),
                }),
            _ => Self::Unrecognized,
        }
    }
}

/// Collect the text of every `output_text` block of an item, in block order.
///
/// Returns an empty list when the item has no content list.
pub(crate) fn output_text_fragments(item: &Value) -> Vec<String> {
    item.get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| str_field(block, "type") == Some(OUTPUT_TEXT))
                .filter_map(|block| non_empty_str(block.get("text")))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Borrow a string field of an object.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Borrow a value as a string, only when it is a non-empty string.
pub(crate) fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
