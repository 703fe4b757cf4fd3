//! Session handler trait and its stock implementations

use crate::error::ClientError;
use crate::protocol::InboundEvent;
use crate::session::event::ClientEvent;
use tokio::sync::mpsc;

/// Receives everything a session reports.
///
/// Connection and message callbacks run on the session's driver task in the
/// order the transport delivered them. `on_error` for a rejected
/// `send_message()` runs on the caller's thread instead, so it may overlap
/// with driver callbacks. Callbacks must not block. Calling back into the
/// client (e.g. `message_buffer()` or `send_message()`) is allowed.
pub trait SessionHandler: Send + Sync + 'static {
    /// A decoded server event. `buffer` is the accumulated reply including
    /// this event; for `complete` it is the final text, cleared right after.
    fn on_message(&self, _event: &InboundEvent, _buffer: &str) {}

    /// Transport opened.
    fn on_connect(&self) {}

    /// Transport closed, by either side.
    fn on_disconnect(&self) {}

    /// Transport error or misuse.
    fn on_error(&self, _error: &ClientError) {}
}

/// Ignores everything.
impl SessionHandler for () {}

type MessageFn = Box<dyn Fn(&InboundEvent, &str) + Send + Sync>;
type SignalFn = Box<dyn Fn() + Send + Sync>;
type ErrorFn = Box<dyn Fn(&ClientError) + Send + Sync>;

/// Handler assembled from optional closures.
#[derive(Default)]
pub struct Callbacks {
    on_message: Option<MessageFn>,
    on_connect: Option<SignalFn>,
    on_disconnect: Option<SignalFn>,
    on_error: Option<ErrorFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_message<F>(mut self, f: F) -> Self
    where
        F: Fn(&InboundEvent, &str) + Send + Sync + 'static,
    {
        self.on_message = Some(Box::new(f));
        self
    }

    pub fn on_connect<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_connect = Some(Box::new(f));
        self
    }

    pub fn on_disconnect<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_disconnect = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl SessionHandler for Callbacks {
    fn on_message(&self, event: &InboundEvent, buffer: &str) {
        if let Some(f) = &self.on_message {
            f(event, buffer);
        }
    }

    fn on_connect(&self) {
        if let Some(f) = &self.on_connect {
            f();
        }
    }

    fn on_disconnect(&self) {
        if let Some(f) = &self.on_disconnect {
            f();
        }
    }

    fn on_error(&self, error: &ClientError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

/// Forwards every callback as a [`ClientEvent`] into an unbounded channel.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: ClientEvent) {
        // receiver gone means nobody is listening any more
        let _ = self.tx.send(event);
    }
}

impl SessionHandler for ChannelHandler {
    fn on_message(&self, event: &InboundEvent, buffer: &str) {
        self.emit(ClientEvent::Message {
            event: event.clone(),
            buffer: buffer.to_string(),
        });
    }

    fn on_connect(&self) {
        self.emit(ClientEvent::Connected);
    }

    fn on_disconnect(&self) {
        self.emit(ClientEvent::Disconnected);
    }

    fn on_error(&self, error: &ClientError) {
        self.emit(ClientEvent::Error {
            error: error.to_string(),
        });
    }
}
