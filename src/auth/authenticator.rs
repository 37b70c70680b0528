//! Strategy dispatch for handshake verification.

use axum::http::HeaderValue;

use crate::auth::basic::BasicCredential;
use crate::auth::decision::AuthDecision;
use crate::auth::jwt::{parse_bearer, JwtVerifier};
use crate::auth::method::AuthMethod;
use crate::http::request::HandshakeRequest;
use crate::observability::metrics;

pub const MISSING_HEADER: &str = "Unauthorized: Authorization header missing";
pub const MALFORMED_TOKEN: &str = "Unauthorized: Malformed token";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const JWT_SECRET_NOT_SET: &str = "Server Configuration Error: JWT secret not set";
pub const BASIC_CREDENTIALS_NOT_SET: &str =
    "Server Configuration Error: Basic auth credentials not set";
pub const UNKNOWN_METHOD: &str = "Server Configuration Error: Unknown auth method";

/// Secret material and strategy selection.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub method: AuthMethod,
    pub jwt_secret: String,
    /// Pre-encoded basic credential, compared against `Basic <credential>`.
    pub credential: String,
}

enum Strategy {
    Open,
    Jwt(JwtVerifier),
    Basic(BasicCredential),
    /// Mode selected without what it needs; every attempt is refused with 500.
    Misconfigured(&'static str),
}

/// Decides whether an inbound handshake may complete.
///
/// Configuration problems are resolved once here. `verify` then only reads
/// the request headers, so it is safe to share across connection tasks.
pub struct Authenticator {
    method: AuthMethod,
    strategy: Strategy,
}

impl Authenticator {
    pub fn new(settings: &AuthSettings) -> Self {
        let strategy = match &settings.method {
            AuthMethod::None => Strategy::Open,
            AuthMethod::Jwt if settings.jwt_secret.is_empty() => {
                Strategy::Misconfigured(JWT_SECRET_NOT_SET)
            }
            AuthMethod::Jwt => Strategy::Jwt(JwtVerifier::new(&settings.jwt_secret)),
            AuthMethod::Basic if settings.credential.is_empty() => {
                Strategy::Misconfigured(BASIC_CREDENTIALS_NOT_SET)
            }
            AuthMethod::Basic => Strategy::Basic(BasicCredential::new(&settings.credential)),
            AuthMethod::Unknown(_) => Strategy::Misconfigured(UNKNOWN_METHOD),
        };

        Self {
            method: settings.method.clone(),
            strategy,
        }
    }

    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// The rejection reason every attempt will get, if the settings are unusable.
    pub fn configuration_error(&self) -> Option<&'static str> {
        match self.strategy {
            Strategy::Misconfigured(reason) => Some(reason),
            _ => None,
        }
    }

    /// Verify one handshake and log the outcome.
    pub fn verify(&self, request: &HandshakeRequest) -> AuthDecision {
        let decision = self.decide(request);

        match &decision {
            AuthDecision::Accept => {
                tracing::info!(method = %self.method, outcome = "accept", "Handshake verified");
            }
            AuthDecision::Reject { status, reason } if status.is_server_error() => {
                tracing::error!(
                    method = %self.method,
                    outcome = "reject",
                    status = status.as_u16(),
                    reason = %reason,
                    "Handshake rejected: server misconfiguration"
                );
            }
            AuthDecision::Reject { status, reason } => {
                tracing::warn!(
                    method = %self.method,
                    outcome = "reject",
                    status = status.as_u16(),
                    reason = %reason,
                    "Handshake rejected"
                );
            }
        }

        metrics::record_handshake(&decision);
        decision
    }

    fn decide(&self, request: &HandshakeRequest) -> AuthDecision {
        match &self.strategy {
            Strategy::Open => AuthDecision::Accept,
            Strategy::Misconfigured(reason) => AuthDecision::misconfigured(*reason),
            Strategy::Jwt(verifier) => match request.authorization() {
                None => AuthDecision::unauthorized(MISSING_HEADER),
                Some(header) => verify_bearer(verifier, header),
            },
            Strategy::Basic(credential) => match request.authorization() {
                None => AuthDecision::unauthorized(MISSING_HEADER),
                Some(header) if credential.matches(header.as_bytes()) => AuthDecision::Accept,
                Some(_) => AuthDecision::unauthorized(UNAUTHORIZED),
            },
        }
    }
}

fn verify_bearer(verifier: &JwtVerifier, header: &HeaderValue) -> AuthDecision {
    let Some(token) = header.to_str().ok().and_then(parse_bearer) else {
        return AuthDecision::unauthorized(MALFORMED_TOKEN);
    };

    match verifier.verify(token) {
        Ok(claims) => {
            tracing::debug!(subject = claims.subject(), "JWT validated");
            AuthDecision::Accept
        }
        Err(err) => AuthDecision::unauthorized(format!("Unauthorized: {err}")),
    }
}
