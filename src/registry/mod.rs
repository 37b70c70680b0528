//! Connection registry subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted upgrade
//!     → client.rs (derive clientId from query, or client_<millis>)
//!     → registry.rs (insert ClientRecord under clientId)
//!     → ... connection lives ...
//!     → close / error / admin disconnect
//!     → registry.rs (remove exactly once; repeat removals are no-ops)
//! ```
//!
//! # Design Decisions
//! - One explicit, cloneable registry handle instead of ambient global state
//! - Later registration under an existing clientId wins, and is logged
//! - Records are immutable; removal is the only mutation after insert

pub mod client;
pub mod connection;
pub mod registry;

pub use client::{derive_client_id, ClientRecord, ClientSummary};
pub use connection::{ClientHandle, ConnectionId, Outbound};
pub use registry::{ConnectionRegistry, DisconnectCause};
