//! `MockTransport`: a `StreamTransport` that replays scripted byte chunks
//! and records every exchange, including whether two streams were ever open
//! at the same time. Used by integration tests that assert replay ordering
//! without a network.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::NetworkError;
use crate::models::StreamRequest;
use crate::traits::{ByteStream, StreamTransport};

/// One request the mock saw, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedExchange {
    pub request: StreamRequest,
}

enum ScriptedExchange {
    Stream(Vec<Bytes>),
    /// Chunks followed by a stream that never yields and never closes.
    Stall(Vec<Bytes>),
    Fail(NetworkError),
}

#[derive(Default)]
pub struct MockTransport {
    exchanges: Mutex<Vec<RecordedExchange>>,
    scripted: Mutex<VecDeque<ScriptedExchange>>,
    probes: Mutex<VecDeque<Result<(), NetworkError>>>,
    active_streams: Arc<AtomicUsize>,
    overlap: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next exchange to stream these chunks and then close.
    pub fn script_stream(&self, chunks: Vec<Bytes>) {
        self.lock_scripted().push_back(ScriptedExchange::Stream(chunks));
    }

    /// Script the next exchange to stream these frames, each terminated by
    /// the wire delimiter, followed by the `[DONE]` sentinel.
    pub fn script_frames(&self, frames: &[&str]) {
        let mut chunks: Vec<Bytes> = frames
            .iter()
            .map(|frame| Bytes::from(format!("{}\n\n", frame)))
            .collect();
        chunks.push(Bytes::from_static(b"data: [DONE]\n\n"));
        self.script_stream(chunks);
    }

    /// Script the next exchange to stream these chunks and then hang,
    /// neither yielding nor closing. Exercises idle-timeout handling.
    pub fn script_stall(&self, chunks: Vec<Bytes>) {
        self.lock_scripted().push_back(ScriptedExchange::Stall(chunks));
    }

    /// Script the next exchange to fail before any bytes arrive.
    pub fn script_failure(&self, error: NetworkError) {
        self.lock_scripted().push_back(ScriptedExchange::Fail(error));
    }

    /// Script the next connectivity probe. Unscripted probes succeed.
    pub fn script_probe(&self, result: Result<(), NetworkError>) {
        self.probes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(result);
    }

    /// Every request seen so far, in order.
    pub fn recorded(&self) -> Vec<RecordedExchange> {
        self.exchanges
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn request_contents(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .map(|exchange| exchange.request.content)
            .collect()
    }

    /// True if a stream was opened while a previous one was still open.
    pub fn overlap_detected(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }

    fn lock_scripted(&self) -> std::sync::MutexGuard<'_, VecDeque<ScriptedExchange>> {
        self.scripted.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, NetworkError> {
        self.exchanges
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(RecordedExchange {
                request: request.clone(),
            });

        if self.active_streams.load(Ordering::SeqCst) > 0 {
            self.overlap.store(true, Ordering::SeqCst);
        }

        let scripted = self.lock_scripted().pop_front();
        match scripted {
            Some(ScriptedExchange::Fail(error)) => Err(error),
            Some(ScriptedExchange::Stream(chunks)) => Ok(Box::pin(ScriptedStream::new(
                chunks,
                false,
                Arc::clone(&self.active_streams),
            ))),
            Some(ScriptedExchange::Stall(chunks)) => Ok(Box::pin(ScriptedStream::new(
                chunks,
                true,
                Arc::clone(&self.active_streams),
            ))),
            // Unscripted exchanges complete immediately.
            None => Ok(Box::pin(ScriptedStream::new(
                vec![Bytes::from_static(b"data: [DONE]\n\n")],
                false,
                Arc::clone(&self.active_streams),
            ))),
        }
    }

    async fn probe(&self) -> Result<(), NetworkError> {
        self.probes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Decrements the active-stream counter when the stream is dropped, whether
/// it was consumed to the end or abandoned by cancellation.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ScriptedStream {
    chunks: VecDeque<Bytes>,
    stall: bool,
    _guard: ActiveGuard,
}

impl ScriptedStream {
    fn new(chunks: Vec<Bytes>, stall: bool, counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            chunks: chunks.into(),
            stall,
            _guard: ActiveGuard(counter),
        }
    }
}

impl Stream for ScriptedStream {
    type Item = Result<Bytes, NetworkError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.chunks.pop_front() {
            Some(chunk) => Poll::Ready(Some(Ok(chunk))),
            None if this.stall => Poll::Pending,
            None => Poll::Ready(None),
        }
    }
}
