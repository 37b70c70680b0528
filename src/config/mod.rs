//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → AuthSettings / SessionSettings handed to subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the life of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Auth problems are warnings, not load errors: the gateway starts and
//!   refuses every handshake with a 500 until the operator fixes them

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, GatewayConfig, LogFormat, ObservabilityConfig, SessionSettings};
pub use validation::{auth_warning, validate_config, ValidationError};
