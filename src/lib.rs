//! Streaming reply client for the Parlance assistant console.
//!
//! Consumes an incrementally-produced assistant reply over a long-lived HTTP
//! response body, reconstructs protocol events from raw byte chunks, drives
//! a per-exchange state machine, and recovers from network loss without
//! losing or duplicating user messages.
//!
//! The entry points are [`pipeline::SendPipeline`] for submitting messages
//! and [`supervisor::ConnectionSupervisor`] for connectivity signals. All
//! observable effects flow through a [`traits::ConversationStore`]
//! implementation such as [`store::MemoryStore`].

pub mod adapters;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod queue;
pub mod store;
pub mod stream;
pub mod supervisor;
pub mod traits;
