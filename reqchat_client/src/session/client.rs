//! Streaming session client
//!
//! Owns one duplex connection to the session endpoint, reassembles streamed
//! replies and reconnects with linear backoff after the transport closes.

use crate::error::{ClientError, Result};
use crate::protocol::{InboundEvent, OutboundCommand};
use crate::session::handler::SessionHandler;
use crate::session::state::{ChatTurn, ClientState, SessionState, SharedState, lock};
use crate::transport::{Connector, Transport, TransportEvent, WsConnector};
use reqchat_config::ChatConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Client for one chat session.
///
/// Nothing happens until [`connect`](Self::connect) is called. From then on a
/// background driver task keeps the connection alive, retrying up to
/// `max_reconnect_attempts` times after each closure, until
/// [`disconnect`](Self::disconnect) is called or the client is dropped.
///
/// ```rust,no_run,ignore
/// use reqchat_client::{Callbacks, StreamingSessionClient};
/// use reqchat_config::ChatConfig;
///
/// let handler = Callbacks::new().on_message(|event, buffer| {
///     println!("{} -> {}", event.kind(), buffer);
/// });
/// let client = StreamingSessionClient::new(ChatConfig::default(), "session-1", token, handler)?;
/// client.connect();
/// client.send_message("Users must be able to reset their password")?;
/// ```
pub struct StreamingSessionClient<C: Connector = WsConnector> {
    session_id: String,
    endpoint: String,
    config: ChatConfig,
    connector: Arc<C>,
    handler: Arc<dyn SessionHandler>,
    shared: SharedState,
}

impl StreamingSessionClient<WsConnector> {
    /// Creates a client that talks WebSocket to the configured API host.
    pub fn new<H: SessionHandler>(
        config: ChatConfig,
        session_id: impl Into<String>,
        token: impl Into<String>,
        handler: H,
    ) -> Result<Self> {
        Self::with_connector(config, session_id, token, handler, WsConnector)
    }
}

impl<C: Connector> StreamingSessionClient<C> {
    /// Creates a client on top of a custom connector.
    pub fn with_connector<H: SessionHandler>(
        config: ChatConfig,
        session_id: impl Into<String>,
        token: impl Into<String>,
        handler: H,
        connector: C,
    ) -> Result<Self> {
        let session_id = session_id.into();
        let token = token.into();

        check_component("session_id", &session_id, &['/', '?', '#'])?;
        check_component("token", &token, &['#', '&'])?;
        config.validate()?;
        let endpoint = config.chat_endpoint(&session_id, &token)?;

        Ok(Self {
            session_id,
            endpoint,
            config,
            connector: Arc::new(connector),
            handler: Arc::new(handler),
            shared: Arc::new(Mutex::new(SessionState::new())),
        })
    }

    /// Starts (or restarts) the connection.
    ///
    /// Does nothing while `Connecting` or `Open`. From `Reconnecting` the
    /// pending backoff is skipped and a new attempt starts immediately.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let (generation, cancel, done, predecessor) = {
            let mut state = lock(&self.shared);
            match state.status {
                ClientState::Connecting | ClientState::Open => {
                    debug!(session_id = %self.session_id, status = ?state.status, "connect ignored");
                    return;
                }
                ClientState::Idle | ClientState::Closed => state.attempts = 0,
                ClientState::Reconnecting => {}
            }

            if let Some(pending) = state.cancel.take() {
                pending.cancel();
            }
            let cancel = CancellationToken::new();
            state.generation += 1;
            state.status = ClientState::Connecting;
            state.cancel = Some(cancel.clone());
            let done = CancellationToken::new();
            let predecessor = state.driver_done.replace(done.clone());
            (state.generation, cancel, done, predecessor)
        };

        let driver = SessionDriver {
            generation,
            cancel,
            predecessor,
            session_id: self.session_id.clone(),
            endpoint: self.endpoint.clone(),
            config: self.config.clone(),
            connector: self.connector.clone(),
            handler: self.handler.clone(),
            shared: self.shared.clone(),
        };
        tokio::spawn(async move {
            let _done = done.drop_guard();
            driver.run().await;
        });
    }

    /// Sends a user utterance.
    ///
    /// Fails with [`ClientError::NotConnected`] unless `Open`; the handler's
    /// `on_error` is invoked as well and nothing is queued.
    pub fn send_message(&self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let frame = OutboundCommand::message(content.as_str()).encode()?;

        let delivered = {
            let mut state = lock(&self.shared);
            let delivered = state.status == ClientState::Open
                && state
                    .outbound
                    .as_ref()
                    .is_some_and(|tx| tx.send(frame).is_ok());
            if delivered {
                state.transcript.push(ChatTurn::user(content));
            }
            delivered
        };

        if delivered {
            Ok(())
        } else {
            debug!(session_id = %self.session_id, "send_message while not open");
            self.handler.on_error(&ClientError::NotConnected);
            Err(ClientError::NotConnected)
        }
    }

    /// Asks the server to start a fresh conversation and clears the local
    /// reply buffer right away. Best effort: returns `false` without side
    /// effects unless `Open`.
    pub fn new_chat(&self, requirement_id: Option<&str>) -> bool {
        let frame = match OutboundCommand::new_chat(requirement_id.map(str::to_string)).encode() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "failed to encode new_chat");
                return false;
            }
        };

        let mut state = lock(&self.shared);
        let sent = state.status == ClientState::Open
            && state
                .outbound
                .as_ref()
                .is_some_and(|tx| tx.send(frame).is_ok());
        if sent {
            state.reset_conversation();
        } else {
            debug!(session_id = %self.session_id, status = ?state.status, "new_chat ignored");
        }
        sent
    }

    /// Closes the connection for good. Never triggers a reconnect, including
    /// one whose backoff timer is already running.
    pub fn disconnect(&self) {
        let mut state = lock(&self.shared);
        state.generation += 1;
        state.status = ClientState::Closed;
        state.outbound = None;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        debug!(session_id = %self.session_id, "disconnected by caller");
    }

    /// True iff a transport is open.
    pub fn is_connected(&self) -> bool {
        let state = lock(&self.shared);
        state.status == ClientState::Open
            && state.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Reply text accumulated since the last `complete` or `new_chat`.
    pub fn message_buffer(&self) -> String {
        lock(&self.shared).buffer.clone()
    }

    /// Completed user and assistant turns of the current conversation.
    pub fn transcript(&self) -> Vec<ChatTurn> {
        lock(&self.shared).transcript.clone()
    }

    pub fn state(&self) -> ClientState {
        lock(&self.shared).status
    }

    /// Reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        lock(&self.shared).attempts
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Full endpoint URL. Contains the token.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

impl<C: Connector> Drop for StreamingSessionClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn check_component(name: &str, value: &str, reserved: &[char]) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidSession(format!("{name} must not be empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || reserved.contains(&c))
    {
        return Err(ClientError::InvalidSession(format!(
            "{name} contains characters not allowed in the endpoint"
        )));
    }
    Ok(())
}

enum Exit {
    /// Superseded by `disconnect()` or a newer `connect()`
    Cancelled,
    /// Transport closed or could not be opened
    Closed,
}

/// Background task owning the transport for one `connect()` call.
struct SessionDriver<C: Connector> {
    generation: u64,
    cancel: CancellationToken,
    /// Exit signal of the driver this one replaces
    predecessor: Option<CancellationToken>,
    session_id: String,
    endpoint: String,
    config: ChatConfig,
    connector: Arc<C>,
    handler: Arc<dyn SessionHandler>,
    shared: SharedState,
}

impl<C: Connector> SessionDriver<C> {
    async fn run(self) {
        // The previous driver was cancelled by `connect()`; its transport
        // must be closed before a new one opens.
        if let Some(predecessor) = &self.predecessor {
            predecessor.cancelled().await;
        }

        loop {
            if let Exit::Cancelled = self.run_connection().await {
                return;
            }

            let Some(delay) = self.schedule_retry() else {
                return;
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            if !self.resume() {
                return;
            }
        }
    }

    async fn run_connection(&self) -> Exit {
        let attempt = tokio::time::timeout(
            self.config.connect_timeout(),
            self.connector.connect(&self.endpoint),
        );
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Exit::Cancelled,
            result = attempt => result,
        };

        let mut transport = match result {
            Ok(Ok(transport)) => transport,
            Ok(Err(err)) => {
                warn!(session_id = %self.session_id, error = %err, "chat connection attempt failed");
                self.handler.on_error(&ClientError::ConnectionError);
                return Exit::Closed;
            }
            Err(_) => {
                warn!(session_id = %self.session_id, "chat connection attempt timed out");
                self.handler.on_error(&ClientError::ConnectionError);
                return Exit::Closed;
            }
        };

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let opened = {
            let mut state = lock(&self.shared);
            if state.is_current(self.generation) {
                state.status = ClientState::Open;
                state.attempts = 0;
                state.outbound = Some(outbound_tx);
                true
            } else {
                false
            }
        };
        if !opened {
            transport.close().await;
            return Exit::Cancelled;
        }

        info!(session_id = %self.session_id, "chat session open");
        self.handler.on_connect();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.handler.on_disconnect();
                    transport.close().await;
                    return Exit::Cancelled;
                }
                Some(text) = outbound_rx.recv() => {
                    if let Err(err) = transport.send(text).await {
                        warn!(session_id = %self.session_id, error = %err, "failed to write frame");
                        self.handler.on_error(&ClientError::ConnectionError);
                    }
                }
                event = transport.next() => match event {
                    TransportEvent::Frame(text) => self.handle_frame(&text),
                    TransportEvent::Error(reason) => {
                        warn!(session_id = %self.session_id, %reason, "chat transport error");
                        self.handler.on_error(&ClientError::ConnectionError);
                    }
                    TransportEvent::Closed => {
                        info!(session_id = %self.session_id, "chat transport closed");
                        return Exit::Closed;
                    }
                },
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        let event = match InboundEvent::decode(text) {
            Ok(event) => event,
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "dropping malformed frame");
                return;
            }
        };

        let buffer = {
            let mut state = lock(&self.shared);
            if let InboundEvent::Chunk { content, .. } = &event {
                state.buffer.push_str(content);
            }
            state.buffer.clone()
        };

        self.handler.on_message(&event, &buffer);

        if let InboundEvent::Complete { .. } = event {
            let mut state = lock(&self.shared);
            let reply = std::mem::take(&mut state.buffer);
            if !reply.is_empty() {
                state.transcript.push(ChatTurn::assistant(reply));
            }
        }
    }

    /// Records a closure and decides whether to retry.
    fn schedule_retry(&self) -> Option<Duration> {
        let next = {
            let mut state = lock(&self.shared);
            if !state.is_current(self.generation) {
                None
            } else {
                state.outbound = None;
                if state.attempts < self.config.max_reconnect_attempts {
                    state.attempts += 1;
                    state.status = ClientState::Reconnecting;
                    Some(state.attempts)
                } else {
                    state.status = ClientState::Closed;
                    state.cancel = None;
                    warn!(
                        session_id = %self.session_id,
                        attempts = state.attempts,
                        "reconnect attempts exhausted"
                    );
                    None
                }
            }
        };

        self.handler.on_disconnect();

        let attempt = next?;
        let delay = self.config.reconnect_delay(attempt);
        debug!(
            session_id = %self.session_id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        Some(delay)
    }

    /// Called when the backoff timer fires; the client may have been
    /// disconnected or reconnected in the meantime.
    fn resume(&self) -> bool {
        let mut state = lock(&self.shared);
        if !state.is_current(self.generation) {
            debug!(session_id = %self.session_id, "reconnect aborted");
            return false;
        }
        state.status = ClientState::Connecting;
        true
    }
}
