//! Connection Handles
//!
//! The session never touches sockets. It sees each client as a
//! [`ConnectionHandle`]: an opaque id plus non-blocking `send` and `close`,
//! backed by a bounded channel that the connection's writer task drains.

use tokio::sync::mpsc;

/// Opaque identity of one live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First group is enough to tell connections apart in logs
        let text = self.0.to_string();
        f.write_str(&text[..8])
    }
}

/// Frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// JSON text frame.
    Text(String),
    /// Close the connection.
    Close,
}

/// Why a frame was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Client is not keeping up; the frame was dropped.
    #[error("Outbound buffer full")]
    Full,

    /// Writer task is gone.
    #[error("Connection closed")]
    Closed,
}

/// Send side of one connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
}

impl ConnectionHandle {
    /// Wrap an existing outbound channel.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Outbound>) -> Self {
        Self { id, tx }
    }

    /// Create a handle with a fresh id and its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(ConnectionId::new(), tx), rx)
    }

    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame without waiting.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.push(Outbound::Text(text.into()))
    }

    /// Ask the writer task to close the connection.
    pub fn close(&self) -> Result<(), SendError> {
        self.push(Outbound::Close)
    }

    fn push(&self, frame: Outbound) -> Result<(), SendError> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }
}
