//! Common test utilities for integration tests.
//!
//! Provides a wired-up client (pipeline, supervisor, store, queue, monitor)
//! over any transport, plus helpers for composing wire bodies.

#![allow(dead_code)]

use std::sync::Arc;

use parlance::config::ClientConfig;
use parlance::pipeline::SendPipeline;
use parlance::queue::OfflineQueue;
use parlance::store::MemoryStore;
use parlance::supervisor::{ConnectionMonitor, ConnectionSupervisor};
use parlance::traits::StreamTransport;

pub struct TestClient {
    pub pipeline: Arc<SendPipeline>,
    pub supervisor: Arc<ConnectionSupervisor>,
    pub store: Arc<MemoryStore>,
    pub queue: Arc<OfflineQueue>,
    pub monitor: Arc<ConnectionMonitor>,
}

/// Install a test subscriber once so `RUST_LOG=debug` surfaces client logs.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Wire a full client over the given transport.
pub fn test_client(transport: Arc<dyn StreamTransport>, config: ClientConfig) -> TestClient {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(OfflineQueue::new());
    let monitor = Arc::new(ConnectionMonitor::new(store.clone()));
    let pipeline = Arc::new(SendPipeline::new(
        transport.clone(),
        store.clone(),
        queue.clone(),
        monitor.clone(),
        config,
    ));
    let supervisor = Arc::new(ConnectionSupervisor::new(
        pipeline.clone(),
        transport,
        monitor.clone(),
        queue.clone(),
    ));
    TestClient {
        pipeline,
        supervisor,
        store,
        queue,
        monitor,
    }
}

/// Join frames into one response body, each terminated by the wire
/// delimiter.
pub fn body_from_frames(frames: &[&str]) -> String {
    frames
        .iter()
        .map(|frame| format!("{}\n\n", frame))
        .collect()
}
