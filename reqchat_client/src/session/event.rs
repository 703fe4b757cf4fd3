//! Client events

use crate::protocol::InboundEvent;

/// Client event, as delivered by [`ChannelHandler`](super::ChannelHandler)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Transport opened
    Connected,

    /// Transport closed
    Disconnected,

    /// Decoded server event together with the reply buffer as it stood when
    /// the event was processed
    Message { event: InboundEvent, buffer: String },

    /// Error occurred
    Error { error: String },
}
