//! Connection identity and the owned send side of a live socket.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Hand outbound frames to the socket's writer task
//! - Stop data sends once the connection has been released

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use axum::extract::ws::{CloseFrame, Message};
use tokio::sync::mpsc;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough since only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a live connection.
///
/// Two connections may share a client id; they never share a connection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Receiving end drained by the socket writer.
pub type Outbound = mpsc::UnboundedReceiver<Message>;

/// Exclusive handle to one live connection.
#[derive(Debug)]
pub struct ClientHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Message>,
    released: AtomicBool,
}

impl ClientHandle {
    /// Create a handle and the outbound queue its writer task should drain.
    pub fn channel() -> (Self, Outbound) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: ConnectionId::new(),
            sender,
            released: AtomicBool::new(false),
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame. Returns false once released or after the writer has gone.
    pub fn send(&self, message: Message) -> bool {
        if self.is_released() {
            return false;
        }
        self.sender.send(message).is_ok()
    }

    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(Message::Text(text.into().into()))
    }

    /// Queue a close frame. Allowed after release so an evicted peer is told.
    pub fn close(&self, code: u16, reason: &str) -> bool {
        let frame = CloseFrame {
            code,
            reason: reason.into(),
        };
        self.sender.send(Message::Close(Some(frame))).is_ok()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    pub(crate) fn mark_released(&self) {
        self.released.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[test]
    fn sends_reach_the_outbound_queue() {
        let (handle, mut outbound) = ClientHandle::channel();
        assert!(handle.send_text("hello"));
        match outbound.try_recv().unwrap() {
            Message::Text(text) => assert_eq!(text.as_str(), "hello"),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn released_handle_drops_data_but_not_close() {
        let (handle, mut outbound) = ClientHandle::channel();
        handle.mark_released();
        assert!(handle.is_released());
        assert!(!handle.send_text("late"));
        assert!(handle.close(1000, "bye"));
        match outbound.try_recv().unwrap() {
            Message::Close(Some(frame)) => {
                assert_eq!(frame.code, 1000);
                assert_eq!(frame.reason.as_str(), "bye");
            }
            other => panic!("unexpected frame {other:?}"),
        }
        assert!(outbound.try_recv().is_err());
    }

    #[test]
    fn send_fails_after_writer_is_gone() {
        let (handle, outbound) = ClientHandle::channel();
        drop(outbound);
        assert!(!handle.send_text("nobody listening"));
    }
}
