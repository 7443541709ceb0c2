//! Data model types shared across the streaming client.
//!
//! # Module structure
//! - `message` - Conversation messages, statuses, metrics, queued entries
//! - `request` - Request body for the streaming endpoint
//! - `topic` - Topic metadata attached to a conversation

mod message;
mod request;
mod topic;

pub use message::{Message, MessageSender, MessageStatus, Metrics, QueuedMessage};
pub use request::StreamRequest;
pub use topic::Topic;
