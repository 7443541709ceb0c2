//! Offline queueing, reconnection backoff, and ordered replay.
//!
//! Uses the scripted `MockTransport` so tests can observe exchange order,
//! stream overlap, and probe outcomes without a network. Timer-dependent
//! tests run with paused time.

mod common;

use std::sync::Arc;

use parlance::adapters::mock::MockTransport;
use parlance::config::ClientConfig;
use parlance::error::NetworkError;
use parlance::models::{MessageSender, MessageStatus};
use parlance::supervisor::ConnectionState;

use common::{test_client, TestClient};

fn mock_client() -> (TestClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let client = test_client(
        transport.clone(),
        ClientConfig::default().with_default_model("test-model"),
    );
    (client, transport)
}

fn completion_frames(text: &str) -> Vec<String> {
    vec![
        format!(r#"data: {{"type":"content","content":"{}"}}"#, text),
        r#"data: {"type":"complete"}"#.to_string(),
    ]
}

fn script_completion(transport: &MockTransport, text: &str) {
    let frames = completion_frames(text);
    let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
    transport.script_frames(&refs);
}

#[tokio::test(start_paused = true)]
async fn test_offline_messages_replay_in_order_without_overlap() {
    let (client, transport) = mock_client();
    client.supervisor.network_lost();

    client.pipeline.submit("m1", Vec::new(), None, None);
    client.pipeline.submit("m2", Vec::new(), None, None);
    client.pipeline.submit("m3", Vec::new(), None, None);
    assert_eq!(client.queue.len(), 3);
    assert!(transport.recorded().is_empty());

    script_completion(&transport, "r1");
    script_completion(&transport, "r2");
    script_completion(&transport, "r3");

    client.supervisor.reconnect_and_replay().await;

    assert_eq!(transport.request_contents(), vec!["m1", "m2", "m3"]);
    assert!(!transport.overlap_detected());
    assert!(client.queue.is_empty());

    let users: Vec<_> = client
        .store
        .messages()
        .into_iter()
        .filter(|m| m.sender == MessageSender::User)
        .collect();
    assert_eq!(users.len(), 3);
    let texts: Vec<&str> = users.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m1", "m2", "m3"]);
    assert!(users.iter().all(|m| m.status == MessageStatus::Success));
}

#[tokio::test(start_paused = true)]
async fn test_replay_reuses_original_user_message_ids() {
    let (client, transport) = mock_client();
    client.supervisor.network_lost();

    let id1 = client.pipeline.submit("m1", Vec::new(), None, None);
    let id2 = client.pipeline.submit("m2", Vec::new(), None, None);

    script_completion(&transport, "r1");
    script_completion(&transport, "r2");
    client.supervisor.reconnect_and_replay().await;

    // Same entries resolved in place, no duplicates.
    let users: Vec<_> = client
        .store
        .messages()
        .into_iter()
        .filter(|m| m.sender == MessageSender::User)
        .collect();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, id1);
    assert_eq!(users[1].id, id2);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_probes_until_backend_answers() {
    let (client, transport) = mock_client();
    client.supervisor.network_lost();
    client.pipeline.submit("queued", Vec::new(), None, None);

    transport.script_probe(Err(NetworkError::ConnectionFailed {
        url: "mock".to_string(),
        message: "refused".to_string(),
    }));
    transport.script_probe(Err(NetworkError::ConnectionFailed {
        url: "mock".to_string(),
        message: "refused".to_string(),
    }));
    // Third probe is unscripted and succeeds.
    script_completion(&transport, "r");

    let started = tokio::time::Instant::now();
    client.supervisor.reconnect_and_replay().await;

    // Attempts 0, 1, 2: 1s + 2s + 4s of backoff before the probe succeeded.
    assert_eq!(started.elapsed(), std::time::Duration::from_secs(7));
    assert_eq!(client.monitor.state(), ConnectionState::Connected);

    let history = client.store.connection_history();
    assert!(history.contains(&ConnectionState::Reconnecting(0)));
    assert!(history.contains(&ConnectionState::Reconnecting(2)));
    assert_eq!(history.last(), Some(&ConnectionState::Connected));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_replay_requeues_remaining() {
    let (client, transport) = mock_client();
    client.supervisor.network_lost();

    client.pipeline.submit("m1", Vec::new(), None, None);
    client.pipeline.submit("m2", Vec::new(), None, None);

    // m1's exchange dies with a connection failure, flipping the monitor
    // back to Offline mid-replay.
    transport.script_failure(NetworkError::ConnectionFailed {
        url: "mock".to_string(),
        message: "reset".to_string(),
    });

    client.supervisor.reconnect_and_replay().await;

    assert_eq!(client.monitor.state(), ConnectionState::Offline);
    // m2 went back to the queue untouched.
    assert_eq!(client.queue.len(), 1);
    assert_eq!(client.queue.drain_all()[0].text, "m2");
    // Only m1 ever reached the transport.
    assert_eq!(transport.request_contents(), vec!["m1"]);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_is_a_noop_when_connected_and_queue_empty() {
    let (client, _transport) = mock_client();

    client.supervisor.reconnect_and_replay().await;

    assert!(client.store.connection_history().is_empty());
    assert!(client.monitor.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_submit_during_replay_lands_in_next_drain() {
    let (client, transport) = mock_client();
    client.supervisor.network_lost();
    client.pipeline.submit("m1", Vec::new(), None, None);

    script_completion(&transport, "r1");
    script_completion(&transport, "r2");

    client.supervisor.reconnect_and_replay().await;
    // A message submitted right after replay goes straight through while
    // connected.
    client
        .pipeline
        .submit_and_wait("m2", Vec::new(), None, None)
        .await;

    assert_eq!(transport.request_contents(), vec!["m1", "m2"]);
    assert!(client.queue.is_empty());
}
