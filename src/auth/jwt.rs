//! Bearer token verification.
//!
//! Tokens are verified against a shared secret using the algorithm the
//! token header declares. Only the HMAC family can be checked with a shared
//! secret, so RSA/EC tokens fail with an algorithm error.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

/// Registered time claims that must be numeric when present.
const TIME_CLAIMS: [&str; 2] = ["exp", "nbf"];

/// Why a bearer token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("jwt expired")]
    Expired,
    #[error("jwt not active")]
    NotActive,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid algorithm")]
    InvalidAlgorithm,
    #[error("jwt malformed")]
    Malformed,
    #[error("invalid {0} value")]
    InvalidClaim(&'static str),
    #[error("{0}")]
    Other(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::ImmatureSignature => JwtError::NotActive,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => JwtError::InvalidAlgorithm,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::Malformed,
            _ => JwtError::Other(err.to_string()),
        }
    }
}

/// Claims read for logging. Nothing here is enforced.
#[derive(Debug, Clone, Default)]
pub struct Claims {
    pub sub: Option<String>,
    pub username: Option<String>,
}

impl Claims {
    fn from_payload(payload: &Map<String, Value>) -> Self {
        let text = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            sub: text("sub"),
            username: text("username"),
        }
    }

    pub fn subject(&self) -> &str {
        self.username
            .as_deref()
            .or(self.sub.as_deref())
            .unwrap_or("unknown user")
    }
}

/// Extract `<token>` from `Bearer <token>`.
///
/// The header must split on single spaces into exactly two parts; the scheme
/// is matched case-insensitively.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

/// Verifies HMAC-signed tokens with a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Check signature, `exp` and `nbf`. Both time claims are optional, but
    /// a present one must be a number.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let header = decode_header(token)?;
        if !matches!(
            header.alg,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(JwtError::InvalidAlgorithm);
        }

        let mut validation = Validation::new(header.alg);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        // jsonwebtoken skips time validation for claims it cannot parse.
        let payload = decode::<Map<String, Value>>(token, &self.key, &validation)?.claims;
        if let Some(claim) = TIME_CLAIMS
            .into_iter()
            .find(|name| payload.get(*name).is_some_and(|v| !v.is_number()))
        {
            return Err(JwtError::InvalidClaim(claim));
        }
        Ok(Claims::from_payload(&payload))
    }
}

/// A token whose header declares `alg`, with a placeholder signature.
#[cfg(test)]
pub(crate) fn unsigned_token(alg: &str) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let header = serde_json::json!({ "alg": alg, "typ": "JWT" }).to_string();
    let claims = serde_json::json!({ "sub": "alice" }).to_string();
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(claims),
        URL_SAFE_NO_PAD.encode(b"signature"),
    )
}
