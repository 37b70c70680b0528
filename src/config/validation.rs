//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port, timeouts, limits)
//! - Validate listener, admin and metrics addresses
//! - Report auth settings that will reject every handshake
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::auth::Authenticator;
use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ws_port must be a positive integer, e.g. ws_port = 9999")]
    ZeroPort,
    #[error("bind_host {0:?} is not an IP address")]
    InvalidBindHost(String),
    #[error("handshake_timeout_secs must be greater than zero")]
    ZeroHandshakeTimeout,
    #[error("max_connections must be greater than zero")]
    ZeroMaxConnections,
    #[error("admin API is enabled but admin.api_key is empty")]
    MissingAdminKey,
    #[error("admin.bind_address {0:?} is not a socket address")]
    InvalidAdminAddress(String),
    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ws_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.listen_addr().is_err() {
        errors.push(ValidationError::InvalidBindHost(config.bind_host.clone()));
    }
    if config.handshake_timeout_secs == 0 {
        errors.push(ValidationError::ZeroHandshakeTimeout);
    }
    if config.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::MissingAdminKey);
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAdminAddress(
                config.admin.bind_address.clone(),
            ));
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reason every handshake will be refused with a 500, if the auth settings are unusable.
pub fn auth_warning(config: &GatewayConfig) -> Option<&'static str> {
    Authenticator::new(&config.auth_settings()).configuration_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig {
            ws_port: 0,
            bind_host: "localhost".into(),
            handshake_timeout_secs: 0,
            max_connections: 0,
            ..Default::default()
        };
        config.admin.enabled = true;
        config.admin.bind_address = "nowhere".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "bad".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::InvalidBindHost("localhost".into()),
                ValidationError::ZeroHandshakeTimeout,
                ValidationError::ZeroMaxConnections,
                ValidationError::MissingAdminKey,
                ValidationError::InvalidAdminAddress("nowhere".into()),
                ValidationError::InvalidMetricsAddress("bad".into()),
            ]
        );
    }

    #[test]
    fn auth_problems_are_warnings_not_errors() {
        let config = GatewayConfig {
            auth_method: AuthMethod::Jwt,
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
        assert!(auth_warning(&config).is_some());

        let config = GatewayConfig {
            auth_method: AuthMethod::Jwt,
            jwt_secret: "s3cret".into(),
            ..Default::default()
        };
        assert_eq!(auth_warning(&config), None);
    }
}
