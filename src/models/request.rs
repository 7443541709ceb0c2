use serde::{Deserialize, Serialize};

/// Request body for the streaming chat endpoint.
///
/// Optional fields are omitted from the wire body entirely rather than sent
/// as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamRequest {
    /// The user-submitted message text.
    pub content: String,
    /// Whether the backend should invoke the model at all.
    pub use_llm: bool,
    /// Model selector understood by the backend.
    pub model_name: String,
    /// Whether the backend should stream a thinking trace before the reply.
    pub enable_thinking_chain: bool,
    /// Topic to continue - None lets the backend detect one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    /// Ids of previously uploaded files to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_files: Option<Vec<String>>,
}

impl StreamRequest {
    /// Create a request with the default toggles.
    pub fn new(content: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            use_llm: true,
            model_name: model_name.into(),
            enable_thinking_chain: true,
            topic_id: None,
            attached_files: None,
        }
    }

    /// Set the topic to continue (builder pattern).
    pub fn with_topic(mut self, topic_id: Option<String>) -> Self {
        self.topic_id = topic_id;
        self
    }

    /// Attach uploaded file ids (builder pattern). An empty list is omitted
    /// from the wire body.
    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attached_files = if attachments.is_empty() {
            None
        } else {
            Some(attachments)
        };
        self
    }

    /// Toggle the thinking-chain stream (builder pattern).
    pub fn with_thinking_chain(mut self, enabled: bool) -> Self {
        self.enable_thinking_chain = enabled;
        self
    }

    /// Toggle model invocation (builder pattern).
    pub fn with_use_llm(mut self, use_llm: bool) -> Self {
        self.use_llm = use_llm;
        self
    }
}
