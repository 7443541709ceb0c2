//! The canonical stream event union.
//!
//! Both wire-schema variants decode into this one type; nothing outside the
//! decoder ever branches on which variant a frame used.

use crate::models::{Metrics, Topic};

/// Typed events produced while streaming one assistant reply.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental thinking-trace fragment; appended, not replaced.
    Thinking { delta: String },
    /// Incremental reply-text fragment; appended, not replaced.
    Content { delta: String },
    /// Topic detected or confirmed by the backend.
    Topic { topic: Topic },
    /// Reply finished successfully.
    Completed { metrics: Option<Metrics> },
    /// Backend reported a failure for this exchange.
    Failed { reason: String },
    /// End-of-stream sentinel (`[DONE]`).
    StreamEnd,
}

impl StreamEvent {
    /// Returns the event type name as a string for logging.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Thinking { .. } => "thinking",
            StreamEvent::Content { .. } => "content",
            StreamEvent::Topic { .. } => "topic",
            StreamEvent::Completed { .. } => "completed",
            StreamEvent::Failed { .. } => "failed",
            StreamEvent::StreamEnd => "stream_end",
        }
    }
}
