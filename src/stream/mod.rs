//! Stream protocol handling: framing, decoding, and the per-exchange session.
//!
//! The wire format is a long-lived HTTP response body of UTF-8 text, split
//! into frames by a blank line (`"\n\n"`). Each frame carries
//! `data: <payload>` where the payload is either the `[DONE]` sentinel or a
//! JSON object in one of two historical schema variants (see `payloads`).
//!
//! # Module structure
//! - `frame` - FrameBuffer, byte chunks in, complete frames out
//! - `events` - The canonical StreamEvent union
//! - `payloads` - Wire payload deserialization for both schema variants
//! - `decoder` - Frame string to StreamEvent
//! - `session` - Per-exchange state machine and cancellation handle

mod decoder;
mod events;
mod frame;
mod payloads;
mod session;

pub use decoder::decode_frame;
pub use events::StreamEvent;
pub use frame::FrameBuffer;
pub use session::{CancelHandle, SessionOutcome, StreamSession, EMPTY_REPLY_FALLBACK};
