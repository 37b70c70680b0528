//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! auth, registry, transport produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (handshake counters, connected-client gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric calls are no-ops until an exporter is installed
//! - Log level comes from RUST_LOG first, then configuration

pub mod logging;
pub mod metrics;
