//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! camelCase keys (`wsPort`, `authMethod`, ...) are accepted as
//! aliases.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::auth::{AuthMethod, AuthSettings};

pub const DEFAULT_WELCOME: &str = "Welcome! You are now connected to the WebSocket proxy.";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Port for the WebSocket listener.
    #[serde(alias = "wsPort")]
    pub ws_port: u16,

    /// Listener host (IP literal).
    pub bind_host: String,

    /// Handshake authentication strategy.
    #[serde(alias = "authMethod")]
    pub auth_method: AuthMethod,

    /// Shared secret for `jwt` mode.
    #[serde(alias = "jwtSecret")]
    pub jwt_secret: String,

    /// Pre-encoded credential for `basic` mode.
    pub auth: String,

    /// Accepted for compatibility; the transport does not negotiate permessage-deflate.
    #[serde(alias = "enableWsCompression")]
    pub enable_ws_compression: bool,

    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,

    /// Timeout for the upgrade request itself, in seconds.
    pub handshake_timeout_secs: u64,

    /// Text sent to each client right after it is registered. Empty disables it.
    pub welcome_message: Option<String>,

    /// Echo text and binary frames back to their sender.
    pub echo: bool,

    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ws_port: 8080,
            bind_host: "0.0.0.0".to_string(),
            auth_method: AuthMethod::None,
            jwt_secret: String::new(),
            auth: String::new(),
            enable_ws_compression: true,
            max_connections: 10_000,
            handshake_timeout_secs: 10,
            welcome_message: Some(DEFAULT_WELCOME.to_string()),
            echo: true,
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Address the WebSocket listener binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.bind_host.parse()?;
        Ok(SocketAddr::new(ip, self.ws_port))
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            method: self.auth_method.clone(),
            jwt_secret: self.jwt_secret.clone(),
            credential: self.auth.clone(),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            welcome_message: self
                .welcome_message
                .clone()
                .filter(|message| !message.is_empty()),
            echo: self.echo,
        }
    }
}

/// Per-connection behaviour after the handshake.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub welcome_message: Option<String>,
    pub echo: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.ws_port, 8080);
        assert_eq!(config.auth_method, AuthMethod::None);
        assert!(config.enable_ws_compression);
        assert_eq!(config.welcome_message.as_deref(), Some(DEFAULT_WELCOME));
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn accepts_camel_case_keys() {
        let config: GatewayConfig = toml::from_str(
            r#"
            wsPort = 9999
            authMethod = "basic"
            auth = "dXNlcjpwYXNz"
            enableWsCompression = false
            "#,
        )
        .unwrap();
        assert_eq!(config.ws_port, 9999);
        assert_eq!(config.auth_method, AuthMethod::Basic);
        assert_eq!(config.auth_settings().credential, "dXNlcjpwYXNz");
        assert!(!config.enable_ws_compression);
    }

    #[test]
    fn unknown_auth_method_still_loads() {
        let config: GatewayConfig = toml::from_str(r#"auth_method = "digest""#).unwrap();
        assert_eq!(config.auth_method, AuthMethod::Unknown("digest".into()));
    }

    #[test]
    fn empty_welcome_disables_it() {
        let config: GatewayConfig = toml::from_str("welcome_message = ''").unwrap();
        assert_eq!(config.session_settings().welcome_message, None);
    }

    #[test]
    fn ipv6_listen_addr() {
        let config = GatewayConfig {
            bind_host: "::1".into(),
            ws_port: 9000,
            ..Default::default()
        };
        assert_eq!(config.listen_addr().unwrap(), "[::1]:9000".parse().unwrap());
    }
}
