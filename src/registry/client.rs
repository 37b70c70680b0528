//! Tracked client records and identity derivation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::request::HandshakeRequest;
use crate::registry::connection::{ClientHandle, ConnectionId};

/// Query parameter a client may use to pick its own identity.
pub const CLIENT_ID_PARAM: &str = "clientId";

/// Identity for a new connection: `?clientId=` when present and non-empty,
/// otherwise `client_<unix millis>`.
///
/// Neither form is guaranteed unique. Two clients may send the same id, and
/// two synthesized ids can land in the same millisecond.
pub fn derive_client_id(request: &HandshakeRequest) -> String {
    request
        .query_param(CLIENT_ID_PARAM)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| synthesize_client_id(Utc::now()))
}

pub fn synthesize_client_id(at: DateTime<Utc>) -> String {
    format!("client_{}", at.timestamp_millis())
}

/// One accepted connection. Immutable once constructed.
#[derive(Debug)]
pub struct ClientRecord {
    client_id: String,
    connection: ClientHandle,
    created_at: DateTime<Utc>,
}

impl ClientRecord {
    pub fn new(client_id: String, connection: ClientHandle) -> Self {
        Self {
            client_id,
            connection,
            created_at: Utc::now(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn connection(&self) -> &ClientHandle {
        &self.connection
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            client_id: self.client_id.clone(),
            connection_id: self.connection_id().to_string(),
            created_at: self.created_at,
        }
    }
}

/// Serializable view of a record for the admin API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClientSummary {
    pub client_id: String,
    pub connection_id: String,
    pub created_at: DateTime<Utc>,
}
