//! Chat wire protocol
//!
//! Every frame in either direction is a single JSON text message tagged by a
//! `type` field.

use serde::{Deserialize, Serialize};

/// Event pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Handshake acknowledged.
    Connected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(default)]
        timestamp: String,
    },
    /// One fragment of the reply currently being streamed.
    Chunk {
        #[serde(default)]
        content: String,
        #[serde(default)]
        timestamp: String,
    },
    /// End of the current reply.
    Complete {
        #[serde(default)]
        timestamp: String,
    },
    /// Server-side failure tied to the current exchange.
    Error {
        #[serde(default)]
        content: String,
        #[serde(default)]
        timestamp: String,
    },
    /// A `new_chat` command took effect.
    ChatCleared {
        #[serde(default)]
        timestamp: String,
    },
}

impl InboundEvent {
    /// Decodes one text frame.
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Connected { .. } => "connected",
            InboundEvent::Chunk { .. } => "chunk",
            InboundEvent::Complete { .. } => "complete",
            InboundEvent::Error { .. } => "error",
            InboundEvent::ChatCleared { .. } => "chat_cleared",
        }
    }

    /// Text payload carried by `chunk` and `error`.
    pub fn content(&self) -> Option<&str> {
        match self {
            InboundEvent::Chunk { content, .. } | InboundEvent::Error { content, .. } => {
                Some(content.as_str())
            }
            _ => None,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            InboundEvent::Connected { timestamp, .. }
            | InboundEvent::Chunk { timestamp, .. }
            | InboundEvent::Complete { timestamp }
            | InboundEvent::Error { timestamp, .. }
            | InboundEvent::ChatCleared { timestamp } => timestamp.as_str(),
        }
    }
}

/// Command sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundCommand {
    /// A user utterance.
    Message { content: String },
    /// Reset the server-side conversation.
    NewChat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requirement_id: Option<String>,
    },
}

impl OutboundCommand {
    pub fn message(content: impl Into<String>) -> Self {
        OutboundCommand::Message {
            content: content.into(),
        }
    }

    pub fn new_chat(requirement_id: Option<String>) -> Self {
        OutboundCommand::NewChat { requirement_id }
    }

    /// Encodes the command as one text frame.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
