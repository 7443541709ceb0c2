//! Error types for the streaming client.
//!
//! Two domains are distinguished:
//!
//! - [`NetworkError`] - transport-level failures (connect, read, HTTP status)
//! - [`StreamError`] - protocol-level failures inside an open stream
//!
//! Parse-level errors never escape the event decoder; they are logged and the
//! offending frame is discarded. Network and protocol errors resolve the
//! owning session to a terminal failed state exactly once and are surfaced to
//! the store as a readable message via `user_message()`.

mod network;
mod stream;

pub use network::{classify_reqwest_error, NetworkError};
pub use stream::StreamError;
