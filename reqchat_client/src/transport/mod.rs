//! Transport abstraction
//!
//! A [`Connector`] opens one duplex text connection per call; the resulting
//! [`Transport`] is owned exclusively by the session driver.

pub mod memory;
pub mod ws;

use crate::error::Result;
use async_trait::async_trait;

pub use memory::{MemoryConnector, MemoryPeer, MemoryTransport};
pub use ws::{WsConnector, WsTransport};

/// Something observed on an open transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One complete text frame.
    Frame(String),
    /// Transport-level failure; usually followed by `Closed`.
    Error(String),
    /// The connection is gone, closed by either side.
    Closed,
}

/// One physical duplex connection.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Writes one text frame.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Waits for the next event. Must be cancel safe.
    async fn next(&mut self) -> TransportEvent;

    /// Closes the connection; errors are ignored.
    async fn close(&mut self);
}

/// Factory for transports.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    /// Opens a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Self::Transport>;
}
