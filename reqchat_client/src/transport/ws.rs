//! WebSocket transport over `tokio-tungstenite`.

use crate::error::Result;
use crate::transport::{Connector, Transport, TransportEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

/// Opens `ws://` / `wss://` connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<WsTransport> {
        let (socket, _) = connect_async(url).await?;
        Ok(WsTransport {
            socket,
            failed: false,
        })
    }
}

/// An open WebSocket connection.
pub struct WsTransport {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    failed: bool,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next(&mut self) -> TransportEvent {
        if self.failed {
            return TransportEvent::Closed;
        }

        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Frame(text),
                Some(Ok(Message::Binary(data))) => {
                    debug!(len = data.len(), "dropping binary frame");
                }
                // tungstenite queues the pong reply itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => return TransportEvent::Closed,
                Some(Err(err)) => {
                    self.failed = true;
                    return TransportEvent::Error(err.to_string());
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
