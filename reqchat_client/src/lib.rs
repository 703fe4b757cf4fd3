//! # ReqChat Client
//!
//! Streaming chat client for the requirements assistant.
//!
//! ## Features
//!
//! - One WebSocket connection per chat session
//! - Token-by-token reply reassembly
//! - Linear-backoff reconnection with a fixed attempt ceiling
//! - Callback or channel based event delivery
//! - In-memory transport for driving the client without a network
//!
//! ## Quick Start
//!
//! ```rust,no_run,ignore
//! use reqchat_client::{ChannelHandler, ClientEvent, StreamingSessionClient};
//! use reqchat_config::ChatConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (handler, mut events) = ChannelHandler::new();
//!     let client = StreamingSessionClient::new(ChatConfig::default(), "session-1", "token", handler)?;
//!     client.connect();
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ClientEvent::Connected => client.send_message("Refine: users can log in")?,
//!             ClientEvent::Message { buffer, .. } => println!("{}", buffer),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export main types
pub use crate::error::{ClientError, Result};
pub use crate::protocol::{InboundEvent, OutboundCommand};
pub use crate::session::{
    Callbacks, ChannelHandler, ChatTurn, ClientEvent, ClientState, Role, SessionHandler,
    StreamingSessionClient,
};
pub use crate::transport::{
    Connector, MemoryConnector, MemoryPeer, Transport, TransportEvent, WsConnector,
};

// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{ClientError, Result};
    pub use crate::protocol::{InboundEvent, OutboundCommand};
    pub use crate::session::{
        Callbacks, ChannelHandler, ClientEvent, ClientState, SessionHandler,
        StreamingSessionClient,
    };
}
