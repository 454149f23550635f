//! Line framing for ChatKit SSE responses.
//!
//! Only `data: ` lines carry payload. Every other line (`event:`, `id:`,
//! comments, blank separators) is ignored, and a payload that is not valid
//! JSON is skipped without aborting the rest of the stream.

use serde_json::Value;
use tracing::debug;

use super::DecodeResult;
use super::event::DecodedEvent;

/// Prefix of a payload line, including the separating space.
pub const DATA_PREFIX: &str = "data: ";

/// Iterate over the payload of every `data: ` line, in arrival order.
pub fn data_payloads(stream: &str) -> impl Iterator<Item = &str> {
    stream
        .split('\n')
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
}

/// Iterate over the events of a stream, skipping malformed payloads.
pub fn events(stream: &str) -> impl Iterator<Item = DecodedEvent> + '_ {
    data_payloads(stream).filter_map(|payload| match serde_json::from_str::<Value>(payload) {
        Ok(value) => Some(DecodedEvent::from_value(&value)),
        Err(e) => {
            debug!(error = %e, payload, "skipping malformed SSE line");
            None
        }
    })
}

/// Reduce a whole SSE stream into a decode result.
#[must_use]
pub fn decode_stream(stream: &str) -> DecodeResult {
    events(stream).fold(DecodeResult::default(), |mut acc, event| {
        acc.apply(event);
        acc
    })
}
