//! Connectivity tracking and offline replay.
//!
//! `ConnectionMonitor` is the shared connection-state cell; the pipeline
//! flips it to `Offline` on connection-level failures and reads it before
//! each submit. `ConnectionSupervisor` owns the reconnect loop: backoff,
//! probe, then sequential replay of the offline queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::pipeline::SendPipeline;
use crate::queue::OfflineQueue;
use crate::traits::{ConversationStore, StreamTransport};

/// Connectivity as the client currently believes it to be.
///
/// Transitions are driven only by network signals and request failures,
/// never by UI action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Offline,
    /// Probing with exponential backoff; carries the attempt counter so a
    /// UI can render a persistent-offline treatment.
    Reconnecting(u32),
}

/// Delay before reconnect attempt `attempt`: `1000ms * 2^attempt`, capped at
/// 30 seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    const BASE_MS: u64 = 1_000;
    const CAP_MS: u64 = 30_000;
    let delay_ms = 2u64
        .saturating_pow(attempt)
        .saturating_mul(BASE_MS)
        .min(CAP_MS);
    Duration::from_millis(delay_ms)
}

/// Shared connection-state cell.
///
/// Every observed change is forwarded to the conversation store and to any
/// `watch` subscribers. Setting the current state again is a no-op.
pub struct ConnectionMonitor {
    state: watch::Sender<ConnectionState>,
    store: Arc<dyn ConversationStore>,
}

impl ConnectionMonitor {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connected);
        Self { state, store }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn set(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::info!(?previous, current = ?next, "connection state changed");
            self.store.on_connection_state_change(next);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

/// Drives reconnection and queue replay.
pub struct ConnectionSupervisor {
    pipeline: Arc<SendPipeline>,
    transport: Arc<dyn StreamTransport>,
    monitor: Arc<ConnectionMonitor>,
    queue: Arc<OfflineQueue>,
    // Held for the whole reconnect loop so two triggers cannot race.
    reconnect_guard: tokio::sync::Mutex<()>,
}

impl ConnectionSupervisor {
    pub fn new(
        pipeline: Arc<SendPipeline>,
        transport: Arc<dyn StreamTransport>,
        monitor: Arc<ConnectionMonitor>,
        queue: Arc<OfflineQueue>,
    ) -> Self {
        Self {
            pipeline,
            transport,
            monitor,
            queue,
            reconnect_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Signal that connectivity was lost (network change event, failed
    /// request). Subsequent submits are queued.
    pub fn network_lost(&self) {
        self.monitor.set(ConnectionState::Offline);
    }

    /// Signal that the network may be back. Spawns the reconnect loop; a
    /// loop already in flight absorbs the signal.
    pub fn network_restored(self: &Arc<Self>) {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            supervisor.reconnect_and_replay().await;
        });
    }

    /// Backoff-probe until the backend answers, then drain and replay the
    /// offline queue in order.
    pub async fn reconnect_and_replay(&self) {
        let _guard = match self.reconnect_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("reconnect loop already running");
                return;
            }
        };

        if self.monitor.is_connected() && self.queue.is_empty() {
            return;
        }

        let mut attempt: u32 = 0;
        loop {
            self.monitor.set(ConnectionState::Reconnecting(attempt));
            tokio::time::sleep(backoff_delay(attempt)).await;
            match self.transport.probe().await {
                Ok(()) => break,
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "connectivity probe failed");
                    attempt = attempt.saturating_add(1);
                }
            }
        }

        self.monitor.set(ConnectionState::Connected);
        self.replay_queue().await;
    }

    /// Resubmit queued messages strictly in order, each awaited to its
    /// terminal state. Loops because a submit may enqueue concurrently with
    /// the drain.
    async fn replay_queue(&self) {
        loop {
            let batch = self.queue.drain_all();
            if batch.is_empty() {
                return;
            }
            tracing::info!(count = batch.len(), "replaying offline queue");
            for queued in batch {
                if !self.monitor.is_connected() {
                    // Connectivity dropped mid-replay; put it back for the
                    // next round.
                    self.queue.enqueue(queued);
                    continue;
                }
                self.pipeline.resubmit(queued).await;
            }
            if !self.monitor.is_connected() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Topic};
    use std::sync::Mutex;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let delays: Vec<u64> = (0..6).map(|n| backoff_delay(n).as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000]);
    }

    #[test]
    fn test_backoff_stays_capped_for_large_attempts() {
        assert_eq!(backoff_delay(20), Duration::from_millis(30_000));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(30_000));
    }

    #[derive(Default)]
    struct HistoryStore {
        states: Mutex<Vec<ConnectionState>>,
    }

    impl ConversationStore for HistoryStore {
        fn on_message_update(&self, _message: Message) {}
        fn on_active_topic_change(&self, _topic: Topic) {}
        fn on_connection_state_change(&self, state: ConnectionState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn test_monitor_forwards_changes_once() {
        let store = Arc::new(HistoryStore::default());
        let monitor = ConnectionMonitor::new(store.clone());

        assert_eq!(monitor.state(), ConnectionState::Connected);
        monitor.set(ConnectionState::Connected); // no-op
        monitor.set(ConnectionState::Offline);
        monitor.set(ConnectionState::Offline); // no-op
        monitor.set(ConnectionState::Reconnecting(0));
        monitor.set(ConnectionState::Connected);

        assert_eq!(
            *store.states.lock().unwrap(),
            vec![
                ConnectionState::Offline,
                ConnectionState::Reconnecting(0),
                ConnectionState::Connected,
            ]
        );
    }

    #[tokio::test]
    async fn test_monitor_subscribers_observe_changes() {
        let store = Arc::new(HistoryStore::default());
        let monitor = ConnectionMonitor::new(store);
        let mut rx = monitor.subscribe();

        monitor.set(ConnectionState::Offline);
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), ConnectionState::Offline);
    }
}
