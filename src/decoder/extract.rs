//! Text and thread extraction for non-streaming JSON replies.

use serde_json::Value;
use tracing::debug;

use super::DecodeResult;
use super::event::{non_empty_str, output_text_fragments};
use crate::common::ids::ThreadId;

/// Where a reply's text may live in a structured response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextSource {
    /// A top-level string field.
    Field(&'static str),
    /// The output-text blocks of a ChatKit `item`.
    ItemContent,
    /// `choices[0].message.content` of a chat-completions style reply.
    FirstChoice,
}

/// Text sources in priority order; the first one that yields text wins.
const FALLBACK_CHAIN: [TextSource; 7] = [
    TextSource::Field("output"),
    TextSource::Field("response"),
    TextSource::Field("message"),
    TextSource::Field("content"),
    TextSource::Field("text"),
    TextSource::ItemContent,
    TextSource::FirstChoice,
];

impl TextSource {
    fn extract(self, body: &Value) -> Option<String> {
        match self {
            Self::Field(key) => non_empty_str(body.get(key)).map(str::to_string),
            Self::ItemContent => {
                let text = output_text_fragments(body.get("item")?).concat();
                (!text.is_empty()).then_some(text)
            }
            Self::FirstChoice => non_empty_str(body.pointer("/choices/0/message/content"))
                .map(str::to_string),
        }
    }
}

/// Decode a structured (non-streaming) reply.
#[must_use]
pub fn decode_object(body: &Value) -> DecodeResult {
    DecodeResult {
        thread_id: thread_id_of(body),
        text: text_of(body),
    }
}

/// Thread id of a structured reply; `thread.id` takes precedence over `thread_id`.
fn thread_id_of(body: &Value) -> Option<ThreadId> {
    let nested = body.get("thread").and_then(|thread| non_empty_str(thread.get("id")));
    nested
        .or_else(|| non_empty_str(body.get("thread_id")))
        .and_then(|id| ThreadId::new(id).ok())
}

/// Reply text of a structured reply, or an empty string.
fn text_of(body: &Value) -> String {
    FALLBACK_CHAIN
        .iter()
        .find_map(|source| {
            let text = source.extract(body)?;
            debug!(?source, "reply text extracted");
            Some(text)
        })
        .unwrap_or_default()
}
