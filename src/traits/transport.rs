use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::error::NetworkError;
use crate::models::StreamRequest;

/// Raw response body as it arrives from the network, in arbitrary chunk
/// boundaries.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, NetworkError>> + Send>>;

/// Transport seam for opening a streaming exchange and probing connectivity.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open the streaming request and return the response body stream once
    /// headers have arrived. A non-2xx response is an `Err`, not a stream.
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, NetworkError>;

    /// Cheap connectivity check used by the reconnect loop.
    async fn probe(&self) -> Result<(), NetworkError>;
}
