//! Streaming chat session
//!
//! The session client owns the connection lifecycle; handlers observe it.

mod client;
mod event;
mod handler;
mod state;

pub use client::StreamingSessionClient;
pub use event::ClientEvent;
pub use handler::{Callbacks, ChannelHandler, SessionHandler};
pub use state::{ChatTurn, ClientState, Role};
