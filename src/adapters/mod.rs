//! Concrete implementations of the `traits` seams.

pub mod mock;
mod reqwest_transport;

pub use reqwest_transport::HttpTransport;
