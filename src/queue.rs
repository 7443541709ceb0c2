//! FIFO queue of messages captured while disconnected.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::QueuedMessage;

/// Queue shared between the pipeline (enqueues) and the supervisor (drains).
///
/// `drain_all` is destructive and atomic: an enqueue racing a drain lands
/// either wholly in the drained batch or wholly in the queue for the next
/// one, never both and never neither.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    inner: Mutex<VecDeque<QueuedMessage>>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, message: QueuedMessage) {
        let mut queue = self.lock();
        tracing::info!(
            user_message_id = %message.user_message_id,
            queued = queue.len() + 1,
            "message queued for offline replay"
        );
        queue.push_back(message);
    }

    /// Take every queued message, oldest first, leaving the queue empty.
    pub fn drain_all(&self) -> Vec<QueuedMessage> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedMessage>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
