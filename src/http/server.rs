//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the upgrade and health handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run handshake verification before the upgrade completes
//! - Enforce max_connections on live WebSocket sessions
//! - Bind the admin API when enabled
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::admin::{setup_admin_router, AdminState};
use crate::auth::Authenticator;
use crate::config::{GatewayConfig, SessionSettings};
use crate::http::request::HandshakeRequest;
use crate::http::websocket::serve_connection;
use crate::lifecycle::shutdown::{wait, Shutdown};
use crate::registry::ConnectionRegistry;

const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub registry: ConnectionRegistry,
    pub session: Arc<SessionSettings>,
    pub connection_limit: Arc<Semaphore>,
}

/// WebSocket gateway server.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a server with a fresh, empty registry.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_registry(config, ConnectionRegistry::new())
    }

    /// Create a server that tracks clients in `registry`.
    pub fn with_registry(config: GatewayConfig, registry: ConnectionRegistry) -> Self {
        let state = AppState {
            authenticator: Arc::new(Authenticator::new(&config.auth_settings())),
            registry,
            session: Arc::new(config.session_settings()),
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/health", get(health_handler))
            .route("/", get(upgrade_handler))
            .route("/{*path}", get(upgrade_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.handshake_timeout_secs,
                    )))
                    .layer(PropagateRequestIdLayer::new(request_id)),
            )
    }

    /// The gateway router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.state.registry
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_method = %self.state.authenticator.method(),
            "Gateway listening for WebSocket connections"
        );

        if self.config.admin.enabled {
            self.spawn_admin(&shutdown).await?;
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait(shutdown.subscribe()))
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    async fn spawn_admin(&self, shutdown: &Shutdown) -> Result<(), ServerError> {
        let bind_address = self.config.admin.bind_address.clone();
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_address.clone(),
                source,
            })?;

        let admin = setup_admin_router(AdminState {
            registry: self.state.registry.clone(),
            auth_method: self.state.authenticator.method().to_string(),
            api_key: Arc::from(self.config.admin.api_key.as_str()),
        });
        let rx = shutdown.subscribe();

        tracing::info!(address = %bind_address, "Admin API listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, admin)
                .with_graceful_shutdown(wait(rx))
                .await
            {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        });
        Ok(())
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.registry.len(),
    }))
}

/// Verify, then upgrade.
///
/// Verification runs before the upgrade headers are even inspected, so a
/// rejected peer always receives the authenticator's status and reason.
async fn upgrade_handler(State(state): State<AppState>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();
    let handshake = HandshakeRequest::from_parts(&parts);

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let span = tracing::info_span!(
        "handshake",
        request_id = %request_id,
        peer = %peer,
        path = %handshake.path()
    );

    let decision = span.in_scope(|| state.authenticator.verify(&handshake));
    if !decision.is_accept() {
        return decision.into_response();
    }

    let upgrade = match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            span.in_scope(|| tracing::debug!(error = %rejection, "Not a valid WebSocket upgrade"));
            return rejection.into_response();
        }
    };

    let permit = match Arc::clone(&state.connection_limit).try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            span.in_scope(|| tracing::warn!("Connection limit reached, refusing upgrade"));
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };

    let registry = state.registry.clone();
    let session = Arc::clone(&state.session);

    upgrade
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| {
            async move {
                // Held until the session ends.
                let _permit = permit;
                serve_connection(socket, handshake, registry, session).await;
            }
            .instrument(span)
        })
}
