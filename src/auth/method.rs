//! Authentication method selection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Strategy used to admit inbound handshakes.
///
/// Unrecognised values are preserved rather than rejected at load time so the
/// gateway can still start and report the mistake on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// No credential check.
    #[default]
    None,
    /// `Authorization: Bearer <jwt>` signed with a shared secret.
    Jwt,
    /// `Authorization: Basic <credential>` compared byte for byte.
    Basic,
    /// Anything else found in configuration.
    Unknown(String),
}

impl AuthMethod {
    pub fn parse(value: &str) -> Self {
        match value {
            "none" => AuthMethod::None,
            "jwt" => AuthMethod::Jwt,
            "basic" => AuthMethod::Basic,
            other => AuthMethod::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::Jwt => "jwt",
            AuthMethod::Basic => "basic",
            AuthMethod::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuthMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AuthMethod::parse(&raw))
    }
}
