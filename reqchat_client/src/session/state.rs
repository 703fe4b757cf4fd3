//! Session state shared between the client handle and its driver task

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Constructed, never connected
    Idle,
    /// Transport being opened
    Connecting,
    /// Transport open, commands may be sent
    Open,
    /// Waiting for the backoff timer before the next attempt
    Reconnecting,
    /// Disconnected by the caller or retries exhausted
    Closed,
}

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One completed utterance of the current conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

pub(crate) struct SessionState {
    pub(crate) status: ClientState,
    pub(crate) attempts: u32,
    pub(crate) buffer: String,
    pub(crate) transcript: Vec<ChatTurn>,
    /// Frames queued for the driver; present only while `Open`
    pub(crate) outbound: Option<mpsc::UnboundedSender<String>>,
    /// Bumped by every `connect()` and `disconnect()`; a driver whose
    /// generation is stale must not touch the connection
    pub(crate) generation: u64,
    pub(crate) cancel: Option<CancellationToken>,
    /// Cancelled once the most recently spawned driver has exited and its
    /// transport is closed
    pub(crate) driver_done: Option<CancellationToken>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            status: ClientState::Idle,
            attempts: 0,
            buffer: String::new(),
            transcript: Vec::new(),
            outbound: None,
            generation: 0,
            cancel: None,
            driver_done: None,
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.status != ClientState::Closed
    }

    pub(crate) fn reset_conversation(&mut self) {
        self.buffer.clear();
        self.transcript.clear();
    }
}

pub(crate) type SharedState = std::sync::Arc<Mutex<SessionState>>;

pub(crate) fn lock(shared: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
