//! Per-exchange state machine.
//!
//! A session is created the moment response headers arrive and folds the
//! decoded event sequence into one assistant message, emitting a store
//! update per event. It resolves to a terminal state exactly once; events
//! after that are ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Message, MessageStatus, Metrics, Topic};
use crate::stream::events::StreamEvent;
use crate::traits::ConversationStore;

/// Shown in place of an assistant turn that completed without producing any
/// text. A blank assistant bubble reads as a rendering bug.
pub const EMPTY_REPLY_FALLBACK: &str = "No response received. Please try again.";

/// Cooperative cancellation flag shared between a session and the pipeline.
///
/// Cancelling is a one-way latch. The read loop checks it between chunks and
/// the session checks it before every store emission, so a superseded
/// exchange stops touching the conversation even if its task is still
/// unwinding.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Success,
    Failed,
}

/// State machine for one in-flight assistant reply.
pub struct StreamSession {
    session_id: String,
    message: Message,
    thinking: String,
    text: String,
    outcome: Option<SessionOutcome>,
    cancel: CancelHandle,
    store: Arc<dyn ConversationStore>,
}

impl StreamSession {
    /// Bind a session to an assistant placeholder already appended to the
    /// store. The placeholder must have `status = Streaming`.
    pub fn new(
        message: Message,
        cancel: CancelHandle,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            message,
            thinking: String::new(),
            text: String::new(),
            outcome: None,
            cancel,
            store,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn message_id(&self) -> &str {
        &self.message.id
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fold one event into the session.
    ///
    /// Returns the terminal outcome when this event ended the session, else
    /// `None`. Events arriving after the terminal state are ignored.
    pub fn apply(&mut self, event: StreamEvent) -> Option<SessionOutcome> {
        if self.is_terminal() {
            tracing::debug!(
                session_id = %self.session_id,
                event = event.event_type_name(),
                "ignoring event after terminal state"
            );
            return None;
        }

        match event {
            StreamEvent::Thinking { delta } => {
                self.thinking.push_str(&delta);
                self.message.thinking = Some(self.thinking.clone());
                self.emit_message();
                None
            }
            StreamEvent::Content { delta } => {
                self.text.push_str(&delta);
                self.message.text = self.text.clone();
                self.emit_message();
                None
            }
            StreamEvent::Topic { topic } => {
                if let Some(id) = &topic.id {
                    self.message.topic_id = Some(id.clone());
                }
                self.emit_topic(topic);
                None
            }
            StreamEvent::Completed { metrics } => Some(self.complete(metrics)),
            StreamEvent::Failed { reason } => Some(self.fail(reason)),
            StreamEvent::StreamEnd => Some(self.complete(None)),
        }
    }

    /// Resolve the session after the byte stream closed without an explicit
    /// terminal event. Idempotent.
    pub fn finish(&mut self) -> SessionOutcome {
        match self.outcome {
            Some(outcome) => outcome,
            None => self.complete(None),
        }
    }

    /// Resolve the session as failed with a display reason. Idempotent.
    pub fn fail(&mut self, reason: String) -> SessionOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        tracing::warn!(
            session_id = %self.session_id,
            message_id = %self.message.id,
            reason = %reason,
            "exchange failed"
        );
        self.message.text = reason;
        self.message.status = MessageStatus::Error;
        self.outcome = Some(SessionOutcome::Failed);
        self.emit_message();
        SessionOutcome::Failed
    }

    fn complete(&mut self, metrics: Option<Metrics>) -> SessionOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        self.message.text = if self.text.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            self.text.clone()
        };
        self.message.status = MessageStatus::Success;
        if metrics.is_some() {
            self.message.metrics = metrics;
        }
        self.outcome = Some(SessionOutcome::Success);
        self.emit_message();
        SessionOutcome::Success
    }

    fn emit_message(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.store.on_message_update(self.message.clone());
    }

    fn emit_topic(&self, topic: Topic) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.store.on_active_topic_change(topic);
    }
}
