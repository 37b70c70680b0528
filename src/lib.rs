//! WebSocket gateway library.
//!
//! Admission control (`auth`) and connection tracking (`registry`) are
//! independent; `http` composes them around the WebSocket upgrade.

pub mod admin;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use auth::{AuthDecision, AuthMethod, AuthSettings, Authenticator};
pub use config::GatewayConfig;
pub use http::{GatewayServer, HandshakeRequest};
pub use lifecycle::Shutdown;
pub use registry::{ClientRecord, ConnectionRegistry, DisconnectCause};
