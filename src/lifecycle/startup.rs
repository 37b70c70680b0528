//! Startup configuration resolution.

use std::path::Path;

use crate::config::{auth_warning, load_config, validate_config, ConfigError, GatewayConfig};

/// Resolve the configuration the binary will run with.
///
/// Without a path the defaults are used. `port` overrides `ws_port` and the
/// result is validated again so the override cannot produce port 0.
pub fn resolve_config(path: Option<&Path>, port: Option<u16>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if let Some(port) = port {
        config.ws_port = port;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Log the resolved configuration. Auth problems are logged at error level.
pub fn report_config(config: &GatewayConfig) {
    tracing::info!(
        ws_port = config.ws_port,
        auth_method = %config.auth_method,
        max_connections = config.max_connections,
        handshake_timeout_secs = config.handshake_timeout_secs,
        compression = config.enable_ws_compression,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.enable_ws_compression {
        tracing::debug!("permessage-deflate is not negotiated by this transport; frames are sent uncompressed");
    }

    if let Some(reason) = auth_warning(config) {
        tracing::error!(
            auth_method = %config.auth_method,
            reason = reason,
            "Authentication is misconfigured, every handshake will be rejected with 500"
        );
    }
}
