//! Handshake request metadata.
//!
//! # Responsibilities
//! - Capture the URI (path + query) and headers of an upgrade request
//! - Case-insensitive header lookup for the authenticator
//! - Query parameter extraction for client identity derivation
//!
//! # Design Decisions
//! - The body is never read; only request parts are kept
//! - Built once per attempt and moved into the connection task

use axum::http::header::{HeaderName, AUTHORIZATION};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Uri};

/// Metadata of one inbound upgrade attempt.
#[derive(Debug, Clone, Default)]
pub struct HandshakeRequest {
    uri: Uri,
    headers: HeaderMap,
}

impl HandshakeRequest {
    pub fn new(uri: Uri, headers: HeaderMap) -> Self {
        Self { uri, headers }
    }

    pub fn from_parts(parts: &Parts) -> Self {
        Self::new(parts.uri.clone(), parts.headers.clone())
    }

    pub fn from_uri(uri: Uri) -> Self {
        Self::new(uri, HeaderMap::new())
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.headers.get(AUTHORIZATION)
    }

    /// First value of a url-encoded query parameter, percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }
}
