//! Handshake admission control.
//!
//! # Data Flow
//! ```text
//! HTTP upgrade request
//!     → http/request.rs (HandshakeRequest: query + headers)
//!     → authenticator.rs (pick strategy by AuthMethod)
//!         → jwt.rs   (Bearer <token>, HMAC signature + time claims)
//!         → basic.rs (exact "Basic <credential>" match)
//!     → AuthDecision (Accept | Reject { status, reason })
//!     → transport completes or refuses the upgrade
//! ```
//!
//! # Design Decisions
//! - Verification is a pure function of the request and immutable settings
//! - Missing secret material is detected once at construction but still
//!   reported per attempt as a 500, never as a startup failure
//! - The authenticator knows nothing about the connection registry

pub mod authenticator;
pub mod basic;
pub mod decision;
pub mod jwt;
pub mod method;

pub use authenticator::{AuthSettings, Authenticator};
pub use decision::AuthDecision;
pub use method::AuthMethod;
