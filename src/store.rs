//! In-memory conversation store.
//!
//! Keeps the ordered message list the pipeline writes into. Updates are
//! upserts by id: the first update for an id appends, later ones replace in
//! place, so append order is preserved while a message streams.

use std::sync::Mutex;

use crate::models::{Message, Topic};
use crate::supervisor::ConnectionState;
use crate::traits::ConversationStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
    active_topic: Mutex<Option<Topic>>,
    connection_states: Mutex<Vec<ConnectionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the conversation in append order.
    pub fn messages(&self) -> Vec<Message> {
        recover(self.messages.lock()).clone()
    }

    pub fn message_by_id(&self, id: &str) -> Option<Message> {
        recover(self.messages.lock())
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn active_topic(&self) -> Option<Topic> {
        recover(self.active_topic.lock()).clone()
    }

    /// Connection state transitions in the order they were observed.
    pub fn connection_history(&self) -> Vec<ConnectionState> {
        recover(self.connection_states.lock()).clone()
    }
}

impl ConversationStore for MemoryStore {
    fn on_message_update(&self, message: Message) {
        let mut messages = recover(self.messages.lock());
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => messages.push(message),
        }
    }

    fn on_active_topic_change(&self, topic: Topic) {
        *recover(self.active_topic.lock()) = Some(topic);
    }

    fn on_connection_state_change(&self, state: ConnectionState) {
        recover(self.connection_states.lock()).push(state);
    }
}

/// A panicked writer leaves the list in a consistent state (whole-message
/// replacement only), so a poisoned lock is still usable.
fn recover<'a, T>(
    result: Result<std::sync::MutexGuard<'a, T>, std::sync::PoisonError<std::sync::MutexGuard<'a, T>>>,
) -> std::sync::MutexGuard<'a, T> {
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}
