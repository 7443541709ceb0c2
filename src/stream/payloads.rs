//! Wire payload deserialization structs.
//!
//! Two historical schema variants are in production use: an older
//! `type`-discriminated shape and a newer `status`-discriminated shape. Both
//! are deserialized here and adapted into [`StreamEvent`]
//! (crate::stream::StreamEvent); the variant distinction ends at this module
//! boundary.

use serde::Deserialize;

use crate::models::{Metrics, Topic};

/// Variant A: `{"type": "thinking"|"content"|"topic"|"complete"|"error", ...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum TypedPayload {
    Thinking {
        #[serde(default)]
        content: Option<String>,
    },
    Content {
        #[serde(default)]
        content: Option<String>,
    },
    Topic {
        #[serde(default)]
        topic: Option<Topic>,
    },
    Complete {
        #[serde(default)]
        metrics: Option<Metrics>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
}

/// Variant B: `{"status": "streaming"|"completed"|"error", ...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum StatusPayload {
    Streaming {
        #[serde(default)]
        chunk: Option<String>,
    },
    Completed {
        #[serde(default)]
        metrics: Option<Metrics>,
        // The final assembled text also arrives here, but the session's
        // accumulated deltas are authoritative; see DESIGN.md.
        #[serde(default)]
        #[allow(dead_code)]
        assistant_message: Option<AssistantMessage>,
    },
    Error {
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    #[serde(default)]
    #[allow(dead_code)]
    pub content: Option<String>,
}
