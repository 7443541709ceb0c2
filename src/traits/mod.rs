//! Seams between the pipeline and the outside world.
//!
//! `StreamTransport` abstracts the network; `ConversationStore` is the only
//! output surface. Production implementations live in `adapters`, the
//! in-memory store in `store`.

mod store;
mod transport;

pub use store::ConversationStore;
pub use transport::{ByteStream, StreamTransport};
