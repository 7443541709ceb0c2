use crate::models::{Message, Topic};
use crate::supervisor::ConnectionState;

/// The consumer-facing output surface.
///
/// Implementations receive every observable effect the client produces:
/// message upserts (keyed by `Message::id`), topic changes, and connection
/// state transitions. Methods are synchronous; implementations that need to
/// notify a UI should hand off to a channel rather than block.
pub trait ConversationStore: Send + Sync {
    fn on_message_update(&self, message: Message);
    fn on_active_topic_change(&self, topic: Topic);
    fn on_connection_state_change(&self, state: ConnectionState);
}
