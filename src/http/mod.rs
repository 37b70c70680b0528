//! HTTP transport for the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, connection limit)
//!     → request.rs (HandshakeRequest from URI + headers)
//!     → auth::Authenticator (accept, or reject with status + reason)
//!     → WebSocket upgrade
//!     → websocket.rs (register, serve frames, release on close/error)
//! ```

pub mod request;
pub mod server;
pub mod websocket;

pub use request::HandshakeRequest;
pub use server::{AppState, GatewayServer, ServerError};
