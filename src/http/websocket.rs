//! Per-connection WebSocket session.
//!
//! # Responsibilities
//! - Register the accepted connection before serving any frame
//! - Drain the client's outbound queue into the socket
//! - Send the welcome text and echo frames when configured
//! - Release the registration exactly once on close or error
//!
//! # Data Flow
//! ```text
//! ClientHandle ──mpsc──→ writer task ──→ socket sink
//! socket stream ──→ reader loop ──→ (echo via ClientHandle)
//!                        │
//!                        └─ Close / end / error → DisconnectCause → release
//! ```
//!
//! # Design Decisions
//! - Close, stream end and read errors all become one DisconnectCause and
//!   converge on a single `release` call
//! - Ping/pong is answered by the underlying protocol implementation

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::config::SessionSettings;
use crate::http::request::HandshakeRequest;
use crate::registry::{ClientHandle, ClientRecord, ConnectionRegistry, DisconnectCause, Outbound};

/// Serve one upgraded connection until it ends.
pub async fn serve_connection(
    socket: WebSocket,
    handshake: HandshakeRequest,
    registry: ConnectionRegistry,
    session: Arc<SessionSettings>,
) {
    let (sink, mut stream) = socket.split();
    let (handle, outbound) = ClientHandle::channel();
    let record = registry.register(handle, &handshake);
    let writer = tokio::spawn(write_frames(sink, outbound));

    if let Some(welcome) = &session.welcome_message {
        record.connection().send_text(welcome.clone());
    }

    let cause = loop {
        match stream.next().await {
            Some(Ok(Message::Close(frame))) => break DisconnectCause::from_close_frame(frame),
            Some(Ok(message @ (Message::Text(_) | Message::Binary(_)))) => {
                on_message(&record, message, &session);
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => break DisconnectCause::Error(e.to_string()),
            None => break DisconnectCause::from_close_frame(None),
        }
    };

    registry.release(&record, cause);

    // Dropping the last handle closes the outbound queue and stops the writer.
    drop(record);
    if let Err(e) = writer.await {
        tracing::error!(error = %e, "WebSocket writer task failed");
    }
}

fn on_message(record: &ClientRecord, message: Message, session: &SessionSettings) {
    if let Message::Text(text) = &message {
        tracing::debug!(client_id = %record.client_id(), len = text.as_str().len(), "Text frame received");
    }
    if session.echo {
        record.connection().send(message);
    }
}

async fn write_frames(
    mut sink: futures_util::stream::SplitSink<WebSocket, Message>,
    mut outbound: Outbound,
) {
    while let Some(message) = outbound.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            tracing::debug!(error = %e, "Socket closed while writing");
            break;
        }
        if closing {
            break;
        }
    }
}
