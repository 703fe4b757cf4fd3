//! High-level client API
//!
//! Wraps [`reqchat_client::StreamingSessionClient`] with an event channel and
//! request/reply helpers for callers that want to `await` whole replies.

use crate::{Error, Result};
use reqchat_client::{
    ChannelHandler, ClientEvent, ClientState, Connector, InboundEvent, StreamingSessionClient,
    WsConnector,
};
use reqchat_config::ChatConfig;
use tokio::sync::mpsc;
use tracing::debug;

/// One chat session driven through an event channel.
///
/// # Example
///
/// ```rust,no_run,ignore
/// use reqchat::ChatSession;
/// use reqchat_config::ChatConfig;
///
/// #[tokio::main]
/// async fn main() -> reqchat::Result<()> {
///     let mut session = ChatSession::open(ChatConfig::default(), "session-1", "token")?;
///     session.wait_connected().await?;
///
///     let reply = session.ask("Users can export reports").await?;
///     println!("{}", reply);
///     Ok(())
/// }
/// ```
pub struct ChatSession<C: Connector = WsConnector> {
    client: StreamingSessionClient<C>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl ChatSession<WsConnector> {
    /// Connects to the configured API host over WebSocket.
    pub fn open(
        config: ChatConfig,
        session_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::open_with_connector(config, session_id, token, WsConnector)
    }
}

impl<C: Connector> ChatSession<C> {
    /// Connects through a custom connector.
    pub fn open_with_connector(
        config: ChatConfig,
        session_id: impl Into<String>,
        token: impl Into<String>,
        connector: C,
    ) -> Result<Self> {
        let (handler, events) = ChannelHandler::new();
        let client =
            StreamingSessionClient::with_connector(config, session_id, token, handler, connector)?;
        client.connect();
        Ok(Self { client, events })
    }

    /// Waits until the transport is open.
    ///
    /// Fails with [`Error::SessionClosed`] once retries are exhausted.
    pub async fn wait_connected(&mut self) -> Result<()> {
        if self.client.is_connected() {
            return Ok(());
        }

        loop {
            match self.events.recv().await {
                Some(ClientEvent::Connected) => return Ok(()),
                Some(ClientEvent::Disconnected) if self.client.state() == ClientState::Closed => {
                    return Err(Error::SessionClosed);
                }
                Some(event) => debug!(?event, "skipped while waiting for connection"),
                None => return Err(Error::SessionClosed),
            }
        }
    }

    /// Sends `text` and waits for the complete reply.
    ///
    /// The reply is built only from chunks received during this call, so
    /// text left over from an earlier failed reply is not included. A server
    /// `error` event fails the request with [`Error::Reply`]; losing the
    /// connection before `complete` fails it with [`Error::SessionClosed`].
    pub async fn ask(&mut self, text: impl Into<String>) -> Result<String> {
        self.client.send_message(text)?;

        let mut reply = String::new();
        loop {
            match self.events.recv().await {
                Some(ClientEvent::Message {
                    event: InboundEvent::Chunk { content, .. },
                    ..
                }) => reply.push_str(&content),
                Some(ClientEvent::Message {
                    event: InboundEvent::Complete { .. },
                    ..
                }) => return Ok(reply),
                Some(ClientEvent::Message {
                    event: InboundEvent::Error { content, .. },
                    ..
                }) => return Err(Error::Reply(content)),
                Some(ClientEvent::Disconnected) | None => return Err(Error::SessionClosed),
                Some(_) => {}
            }
        }
    }

    /// Next raw event, for callers rendering replies incrementally.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    /// Starts a fresh conversation; see
    /// [`StreamingSessionClient::new_chat`].
    pub fn new_chat(&self, requirement_id: Option<&str>) -> bool {
        self.client.new_chat(requirement_id)
    }

    /// The underlying session client.
    pub fn client(&self) -> &StreamingSessionClient<C> {
        &self.client
    }

    /// Disconnects and drops the session.
    pub fn close(self) {
        self.client.disconnect();
    }
}
