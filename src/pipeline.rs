//! Orchestration of one user-submitted message.
//!
//! The pipeline owns the submit path: optimistic user entry, offline
//! deferral, supersession of the in-flight exchange, and driving the read
//! loop that feeds FrameBuffer → decoder → session.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;

use crate::config::ClientConfig;
use crate::error::{NetworkError, StreamError};
use crate::models::{Message, MessageStatus, QueuedMessage, StreamRequest};
use crate::queue::OfflineQueue;
use crate::stream::{decode_frame, CancelHandle, FrameBuffer, SessionOutcome, StreamSession};
use crate::supervisor::{ConnectionMonitor, ConnectionState};
use crate::traits::{ByteStream, ConversationStore, StreamTransport};

/// Everything needed to run one online exchange.
struct Exchange {
    user: Message,
    request: StreamRequest,
    cancel: CancelHandle,
}

enum Prepared {
    /// Deferred to the offline queue; carries the user message id.
    Queued(String),
    Online(Exchange),
}

pub struct SendPipeline {
    transport: Arc<dyn StreamTransport>,
    store: Arc<dyn ConversationStore>,
    queue: Arc<OfflineQueue>,
    monitor: Arc<ConnectionMonitor>,
    config: ClientConfig,
    /// Handle of the in-flight exchange; swapped (and the old one cancelled)
    /// synchronously in submit so rapid submits supersede in call order.
    active_cancel: Mutex<Option<CancelHandle>>,
}

impl SendPipeline {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        store: Arc<dyn ConversationStore>,
        queue: Arc<OfflineQueue>,
        monitor: Arc<ConnectionMonitor>,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            store,
            queue,
            monitor,
            config,
            active_cancel: Mutex::new(None),
        }
    }

    /// Submit a message, fire-and-forget. Returns the id of the optimistic
    /// user message, which is already visible in the store when this returns.
    /// Progress is observed through store updates.
    pub fn submit(
        self: &Arc<Self>,
        text: impl Into<String>,
        attachments: Vec<String>,
        model: Option<String>,
        topic_id: Option<String>,
    ) -> String {
        match self.prepare(text.into(), attachments, model, topic_id) {
            Prepared::Queued(id) => id,
            Prepared::Online(exchange) => {
                let id = exchange.user.id.clone();
                let pipeline = Arc::clone(self);
                tokio::spawn(async move {
                    pipeline.run_exchange(exchange).await;
                });
                id
            }
        }
    }

    /// Like [`submit`](Self::submit), but resolves once the exchange reaches
    /// its terminal state. Used by replay and tests.
    pub async fn submit_and_wait(
        self: &Arc<Self>,
        text: impl Into<String>,
        attachments: Vec<String>,
        model: Option<String>,
        topic_id: Option<String>,
    ) -> String {
        match self.prepare(text.into(), attachments, model, topic_id) {
            Prepared::Queued(id) => id,
            Prepared::Online(exchange) => {
                let id = exchange.user.id.clone();
                self.run_exchange(exchange).await;
                id
            }
        }
    }

    /// Replay one queued message, reusing its original user message id so
    /// the conversation shows `offline → sending → success/error` on the
    /// same entry. Resolves at the terminal state.
    pub async fn resubmit(self: &Arc<Self>, queued: QueuedMessage) {
        let mut user = Message {
            id: queued.user_message_id.clone(),
            sender: crate::models::MessageSender::User,
            text: queued.text.clone(),
            created_at: queued.submitted_at,
            status: MessageStatus::Sending,
            topic_id: queued.topic_id.clone(),
            model: queued.model.clone(),
            thinking: None,
            metrics: None,
        };
        self.store.on_message_update(user.clone());

        if !self.monitor.is_connected() {
            // Lost connectivity again between drain and replay.
            user.status = MessageStatus::Offline;
            self.store.on_message_update(user);
            self.queue.enqueue(queued);
            return;
        }

        let request = self
            .build_request(&queued.text, queued.attachments, &user.model, &queued.topic_id);
        let exchange = Exchange {
            user,
            request,
            cancel: self.rebind_cancel(),
        };
        self.run_exchange(exchange).await;
    }

    fn prepare(
        &self,
        text: String,
        attachments: Vec<String>,
        model: Option<String>,
        topic_id: Option<String>,
    ) -> Prepared {
        let model = model.or_else(|| self.config.default_model.clone());
        let mut user = Message::user(text.clone())
            .with_model(model.clone())
            .with_topic(topic_id.clone());
        self.store.on_message_update(user.clone());

        if !self.monitor.is_connected() {
            let id = user.id.clone();
            user.status = MessageStatus::Offline;
            self.store.on_message_update(user);
            self.queue.enqueue(QueuedMessage {
                text,
                attachments,
                submitted_at: chrono::Utc::now(),
                user_message_id: id.clone(),
                model,
                topic_id,
            });
            return Prepared::Queued(id);
        }

        let request = self.build_request(&text, attachments, &model, &topic_id);
        Prepared::Online(Exchange {
            user,
            request,
            cancel: self.rebind_cancel(),
        })
    }

    fn build_request(
        &self,
        text: &str,
        attachments: Vec<String>,
        model: &Option<String>,
        topic_id: &Option<String>,
    ) -> StreamRequest {
        let model_name = model.clone().unwrap_or_else(|| "default".to_string());
        StreamRequest::new(text, model_name)
            .with_use_llm(self.config.use_llm)
            .with_thinking_chain(self.config.enable_thinking_chain)
            .with_topic(topic_id.clone())
            .with_attachments(attachments)
    }

    /// Cancel the in-flight exchange, if any, and install a fresh handle.
    fn rebind_cancel(&self) -> CancelHandle {
        let cancel = CancelHandle::new();
        let mut active = self
            .active_cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = active.replace(cancel.clone()) {
            tracing::debug!("superseding in-flight exchange");
            previous.cancel();
        }
        cancel
    }

    async fn run_exchange(&self, exchange: Exchange) {
        let Exchange {
            mut user,
            request,
            cancel,
        } = exchange;

        let stream = match self.transport.open_stream(&request).await {
            Ok(stream) => stream,
            Err(err) => {
                self.handle_open_failure(&mut user, &cancel, err);
                return;
            }
        };

        // Headers arrived; the placeholder goes up before any body bytes.
        let placeholder =
            Message::assistant_placeholder(user.model.clone(), request.topic_id.clone());
        if !cancel.is_cancelled() {
            self.store.on_message_update(placeholder.clone());
        }
        let mut session =
            StreamSession::new(placeholder, cancel.clone(), Arc::clone(&self.store));

        let outcome = self.drive_session(stream, &mut session).await;

        if cancel.is_cancelled() {
            return;
        }
        user.status = match outcome {
            SessionOutcome::Success => MessageStatus::Success,
            SessionOutcome::Failed => MessageStatus::Error,
        };
        self.store.on_message_update(user);
    }

    fn handle_open_failure(&self, user: &mut Message, cancel: &CancelHandle, err: NetworkError) {
        tracing::warn!(code = err.error_code(), error = %err, "stream request failed");
        if err.is_connectivity_loss() {
            self.monitor.set(ConnectionState::Offline);
        }
        if cancel.is_cancelled() {
            return;
        }
        // Both turns carry the failure so a retry is discoverable.
        let mut assistant = Message::assistant_placeholder(user.model.clone(), None);
        assistant.text = err.user_message();
        assistant.status = MessageStatus::Error;
        self.store.on_message_update(assistant);

        user.status = MessageStatus::Error;
        self.store.on_message_update(user.clone());
    }

    /// Read chunks until the session resolves, the stream closes, the idle
    /// window elapses, or the exchange is superseded.
    async fn drive_session(
        &self,
        mut stream: ByteStream,
        session: &mut StreamSession,
    ) -> SessionOutcome {
        let mut buffer = FrameBuffer::new();

        loop {
            if session.is_cancelled() {
                tracing::debug!(session_id = %session.session_id(), "exchange superseded");
                return session.finish();
            }

            let next = tokio::time::timeout(self.config.idle_timeout, stream.next()).await;
            if session.is_cancelled() {
                return session.finish();
            }
            match next {
                Err(_) => {
                    let err = StreamError::IdleTimeout {
                        duration_secs: self.config.idle_timeout.as_secs(),
                    };
                    tracing::warn!(code = err.error_code(), error = %err, "stream idle");
                    self.monitor.set(ConnectionState::Offline);
                    return session.fail(err.user_message());
                }
                Ok(None) => {
                    for frame in buffer.flush() {
                        if let Some(event) = decode_frame(&frame) {
                            session.apply(event);
                        }
                    }
                    return session.finish();
                }
                Ok(Some(Err(err))) => {
                    tracing::warn!(code = err.error_code(), error = %err, "stream read failed");
                    if err.is_connectivity_loss() {
                        self.monitor.set(ConnectionState::Offline);
                    }
                    return session.fail(err.user_message());
                }
                Ok(Some(Ok(chunk))) => {
                    for frame in buffer.feed(&chunk) {
                        if let Some(event) = decode_frame(&frame) {
                            session.apply(event);
                        }
                    }
                    if session.is_terminal() {
                        return session.finish();
                    }
                }
            }
        }
    }
}
