//! Frame-to-event decoding.
//!
//! One malformed frame must never abort an otherwise-healthy stream, so
//! every failure path here discards the frame (with a log line) instead of
//! returning an error.

use crate::error::StreamError;
use crate::stream::events::StreamEvent;
use crate::stream::payloads::{StatusPayload, TypedPayload};

/// Payload marking the end of the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Required frame prefix; anything else is protocol noise (SSE comments,
/// heartbeats) and is dropped.
const DATA_PREFIX: &str = "data:";

/// Decode one frame into a [`StreamEvent`], or `None` if the frame carries
/// nothing actionable.
pub fn decode_frame(frame: &str) -> Option<StreamEvent> {
    let trimmed = frame.trim();
    let payload = match trimmed.strip_prefix(DATA_PREFIX) {
        Some(rest) => rest.trim(),
        None => {
            tracing::trace!(frame = %truncate(trimmed, 80), "discarding non-data frame");
            return None;
        }
    };

    if payload.is_empty() {
        return None;
    }
    if payload == DONE_SENTINEL {
        return Some(StreamEvent::StreamEnd);
    }

    // Try the type-discriminated variant first, then the status-discriminated
    // one; only if both fail is the frame malformed.
    if let Ok(typed) = serde_json::from_str::<TypedPayload>(payload) {
        return from_typed(typed);
    }
    match serde_json::from_str::<StatusPayload>(payload) {
        Ok(status) => from_status(status),
        Err(err) => {
            let parse_error = StreamError::InvalidJson {
                message: err.to_string(),
            };
            tracing::warn!(
                code = parse_error.error_code(),
                error = %parse_error,
                frame = %truncate(payload, 120),
                "discarding malformed stream frame"
            );
            None
        }
    }
}

fn from_typed(payload: TypedPayload) -> Option<StreamEvent> {
    match payload {
        TypedPayload::Thinking { content } => Some(StreamEvent::Thinking {
            delta: content.unwrap_or_default(),
        }),
        TypedPayload::Content { content } => Some(StreamEvent::Content {
            delta: content.unwrap_or_default(),
        }),
        TypedPayload::Topic { topic } => topic.map(|topic| StreamEvent::Topic { topic }),
        TypedPayload::Complete { metrics } => Some(StreamEvent::Completed { metrics }),
        TypedPayload::Error { message, content } => Some(StreamEvent::Failed {
            reason: message
                .or(content)
                .unwrap_or_else(|| "The server reported an error.".to_string()),
        }),
    }
}

fn from_status(payload: StatusPayload) -> Option<StreamEvent> {
    match payload {
        StatusPayload::Streaming { chunk } => chunk.map(|delta| StreamEvent::Content { delta }),
        StatusPayload::Completed { metrics, .. } => Some(StreamEvent::Completed { metrics }),
        StatusPayload::Error { error } => Some(StreamEvent::Failed {
            reason: error.unwrap_or_else(|| "The server reported an error.".to_string()),
        }),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
