//! In-process transport
//!
//! Every successful [`MemoryConnector::connect`] hands the server side of the
//! connection out as a [`MemoryPeer`], which can push frames, fail or close
//! the connection and read what the client sent. Used to drive the session
//! client without a network.

use crate::error::{ClientError, Result};
use crate::protocol::InboundEvent;
use crate::transport::{Connector, Transport, TransportEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

struct ConnectorState {
    attempts: AtomicUsize,
    refuse: AtomicUsize,
    urls: Mutex<Vec<String>>,
    peers_tx: mpsc::UnboundedSender<MemoryPeer>,
    peers_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MemoryPeer>>,
}

/// Connector producing in-memory transports.
#[derive(Clone)]
pub struct MemoryConnector {
    state: Arc<ConnectorState>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(ConnectorState {
                attempts: AtomicUsize::new(0),
                refuse: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
                peers_tx,
                peers_rx: tokio::sync::Mutex::new(peers_rx),
            }),
        }
    }

    /// Makes the next `count` connection attempts fail.
    pub fn refuse_next(&self, count: usize) {
        self.state.refuse.store(count, Ordering::SeqCst);
    }

    /// Number of connection attempts so far, refused ones included.
    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    /// URLs passed to `connect`, in order.
    pub fn urls(&self) -> Vec<String> {
        self.state
            .urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Waits for the next accepted connection.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        self.state.peers_rx.lock().await.recv().await
    }

    /// Returns an already accepted connection, if any.
    pub fn try_accept(&self) -> Option<MemoryPeer> {
        self.state.peers_rx.try_lock().ok()?.try_recv().ok()
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, url: &str) -> Result<MemoryTransport> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        self.state
            .urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let refused = self
            .state
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ClientError::ConnectionFailed("connection refused".to_string()));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let peer = MemoryPeer {
            events: events_tx,
            sent: sent_rx,
        };
        self.state
            .peers_tx
            .send(peer)
            .map_err(|_| ClientError::ConnectionFailed("connector dropped".to_string()))?;

        Ok(MemoryTransport {
            events: events_rx,
            sent: Some(sent_tx),
        })
    }
}

/// Client side of an in-memory connection.
pub struct MemoryTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        let sent = self.sent.as_ref().ok_or(ClientError::NotConnected)?;
        sent.send(text)
            .map_err(|_| ClientError::SendFailed("peer dropped".to_string()))
    }

    async fn next(&mut self) -> TransportEvent {
        self.events.recv().await.unwrap_or(TransportEvent::Closed)
    }

    async fn close(&mut self) {
        self.sent = None;
        self.events.close();
    }
}

/// Server side of an in-memory connection.
pub struct MemoryPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Delivers a raw text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Frame(text.into()));
    }

    /// Delivers an encoded event to the client.
    pub fn send_event(&self, event: &InboundEvent) {
        if let Ok(text) = serde_json::to_string(event) {
            self.send_text(text);
        }
    }

    /// Reports a transport error without closing.
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.events.send(TransportEvent::Error(reason.into()));
    }

    /// Closes the connection from the server side.
    pub fn close(&self) {
        let _ = self.events.send(TransportEvent::Closed);
    }

    /// True once the client has closed or dropped its end.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Waits for the next frame written by the client.
    pub async fn recv(&mut self) -> Option<String> {
        self.sent.recv().await
    }

    /// Returns a frame written by the client, if one is waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.sent.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let connector = MemoryConnector::new();
        let mut transport = connector.connect("ws://memory/chat").await.unwrap();
        let mut peer = connector.accept().await.unwrap();

        transport.send("ping".to_string()).await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("ping"));

        peer.send_text("pong");
        assert_eq!(transport.next().await, TransportEvent::Frame("pong".to_string()));

        peer.close();
        assert_eq!(transport.next().await, TransportEvent::Closed);
        assert_eq!(connector.urls(), vec!["ws://memory/chat".to_string()]);
    }

    #[tokio::test]
    async fn test_refused_attempts() {
        let connector = MemoryConnector::new();
        connector.refuse_next(1);

        assert!(connector.connect("ws://memory").await.is_err());
        assert!(connector.connect("ws://memory").await.is_ok());
        assert_eq!(connector.attempts(), 2);
        assert!(connector.try_accept().is_some());
        assert!(connector.try_accept().is_none());
    }

    #[tokio::test]
    async fn test_dropped_peer_reads_as_closed() {
        let connector = MemoryConnector::new();
        let mut transport = connector.connect("ws://memory").await.unwrap();
        drop(connector.accept().await);

        assert_eq!(transport.next().await, TransportEvent::Closed);
        assert!(transport.send("late".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_client_close_is_visible_to_peer() {
        let connector = MemoryConnector::new();
        let mut transport = connector.connect("ws://memory").await.unwrap();
        let peer = connector.accept().await.unwrap();

        assert!(!peer.is_closed());
        transport.close().await;
        assert!(peer.is_closed());
    }
}
