//! Client-specific error types

use reqchat_config::ConfigError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Client-specific errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Session identifier or token cannot form a valid endpoint
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Operation requires an open connection
    #[error("Not connected")]
    NotConnected,

    /// Generic transport-level failure reported to handlers
    #[error("Connection error")]
    ConnectionError,

    /// Connection attempt failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Send operation failed
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Frame encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
        assert_eq!(ClientError::NotConnected.to_string(), "Not connected");
        assert_eq!(ClientError::ConnectionError.to_string(), "Connection error");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ClientError = ConfigError::Validation("bad base".to_string()).into();
        assert!(matches!(err, ClientError::InvalidConfig(msg) if msg.contains("bad base")));
    }
}
