use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Assistant,
}

/// Lifecycle status of a message in the conversation store.
///
/// A message is mutated in place by id while `Sending`/`Streaming` and
/// becomes immutable once it reaches `Success` or `Error`. `Offline` marks a
/// user message that was queued for replay while disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Streaming,
    Success,
    Error,
    Offline,
}

impl MessageStatus {
    /// Whether the message has reached a final state and will not change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Success | MessageStatus::Error)
    }
}

/// Usage metrics reported by the backend on completion.
///
/// Unknown wire fields are ignored; both fields are optional because the two
/// wire-schema variants report different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// A single entry in the conversation.
///
/// Created by the send pipeline (user entries and the assistant streaming
/// placeholder) and updated by id through the conversation store as stream
/// events arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: MessageSender,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
    /// Topic this message was routed to, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    /// Model that produced (or will produce) the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Cumulative thinking trace streamed alongside the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl Message {
    /// Create an optimistic user entry with `status = Sending`.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: MessageSender::User,
            text: text.into(),
            created_at: Utc::now(),
            status: MessageStatus::Sending,
            topic_id: None,
            model: None,
            thinking: None,
            metrics: None,
        }
    }

    /// Create the assistant streaming placeholder shown while a reply is
    /// being produced.
    pub fn assistant_placeholder(model: Option<String>, topic_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: MessageSender::Assistant,
            text: String::new(),
            created_at: Utc::now(),
            status: MessageStatus::Streaming,
            topic_id,
            model,
            thinking: None,
            metrics: None,
        }
    }

    /// Set the model selector (builder pattern).
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Set the topic selector (builder pattern).
    pub fn with_topic(mut self, topic_id: Option<String>) -> Self {
        self.topic_id = topic_id;
        self
    }
}

/// A user submission captured while disconnected, awaiting replay.
///
/// Carries the id of the optimistic user `Message` already in the store so
/// replay updates that entry in place instead of appending a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedMessage {
    pub text: String,
    pub attachments: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub user_message_id: String,
    pub model: Option<String>,
    pub topic_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_defaults() {
        let msg = Message::user("hello");
        assert_eq!(msg.sender, MessageSender::User);
        assert_eq!(msg.status, MessageStatus::Sending);
        assert_eq!(msg.text, "hello");
        assert!(msg.thinking.is_none());
        assert!(msg.metrics.is_none());
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_assistant_placeholder_is_streaming() {
        let msg = Message::assistant_placeholder(
            Some("gpt-x".to_string()),
            Some("topic-1".to_string()),
        );
        assert_eq!(msg.sender, MessageSender::Assistant);
        assert_eq!(msg.status, MessageStatus::Streaming);
        assert!(msg.text.is_empty());
        assert_eq!(msg.model.as_deref(), Some("gpt-x"));
        assert_eq!(msg.topic_id.as_deref(), Some("topic-1"));
    }

    #[test]
    fn test_status_terminality() {
        assert!(MessageStatus::Success.is_terminal());
        assert!(MessageStatus::Error.is_terminal());
        assert!(!MessageStatus::Sending.is_terminal());
        assert!(!MessageStatus::Streaming.is_terminal());
        assert!(!MessageStatus::Offline.is_terminal());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("a");
        let b = Message::user("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_message_serialization_omits_empty_optionals() {
        let msg = Message::user("hi");
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(!json.contains("thinking"));
        assert!(!json.contains("metrics"));
        assert!(json.contains("\"sender\":\"user\""));
        assert!(json.contains("\"status\":\"sending\""));
    }

    #[test]
    fn test_metrics_deserialization_ignores_unknown_fields() {
        let json = r#"{"tokens_used": 3, "cache_hits": 9}"#;
        let metrics: Metrics = serde_json::from_str(json).expect("deserialize");
        assert_eq!(metrics.tokens_used, Some(3));
        assert_eq!(metrics.duration_ms, None);
    }

    #[test]
    fn test_message_roundtrip() {
        let mut msg = Message::user("roundtrip").with_model(Some("m".to_string()));
        msg.metrics = Some(Metrics {
            tokens_used: Some(42),
            duration_ms: Some(120),
        });
        let json = serde_json::to_string(&msg).expect("serialize");
        let back: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(msg, back);
    }
}
