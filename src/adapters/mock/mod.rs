//! Scripted transport for tests.

mod transport;

pub use transport::{MockTransport, RecordedExchange};
