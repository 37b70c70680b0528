//! In-memory directory of live connections keyed by client identity.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::CloseFrame;
use dashmap::DashMap;

use crate::http::request::HandshakeRequest;
use crate::observability::metrics;
use crate::registry::client::{derive_client_id, ClientRecord, ClientSummary};
use crate::registry::connection::ClientHandle;

/// Normal closure code sent on administrative disconnect.
const CLOSE_NORMAL: u16 = 1000;

/// Why a client left the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectCause {
    /// Peer closed, or the stream ended without a close frame (`code` is `None`).
    Closed { code: Option<u16>, reason: String },
    /// Transport error on the live connection.
    Error(String),
    /// Removed by an operator.
    Administrative(String),
}

impl DisconnectCause {
    pub fn from_close_frame(frame: Option<CloseFrame>) -> Self {
        match frame {
            Some(frame) => DisconnectCause::Closed {
                code: Some(frame.code),
                reason: frame.reason.as_str().to_string(),
            },
            None => DisconnectCause::Closed {
                code: None,
                reason: String::new(),
            },
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DisconnectCause::Closed { .. } => "close",
            DisconnectCause::Error(_) => "error",
            DisconnectCause::Administrative(_) => "admin",
        }
    }
}

impl fmt::Display for DisconnectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectCause::Closed {
                code: Some(code),
                reason,
            } => write!(f, "closed (code {code}, reason {reason:?})"),
            DisconnectCause::Closed { code: None, .. } => write!(f, "closed (no close frame)"),
            DisconnectCause::Error(message) => write!(f, "error: {message}"),
            DisconnectCause::Administrative(reason) => write!(f, "disconnected by admin: {reason}"),
        }
    }
}

/// Shared map of tracked clients.
///
/// Cloning yields another handle to the same map. Each operation is atomic on
/// its own; nothing spans more than one map operation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    clients: Arc<DashMap<String, Arc<ClientRecord>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted connection.
    ///
    /// An existing record under the same id is replaced. The displaced
    /// connection stays open but is no longer tracked.
    pub fn register(&self, connection: ClientHandle, request: &HandshakeRequest) -> Arc<ClientRecord> {
        let record = Arc::new(ClientRecord::new(derive_client_id(request), connection));

        let displaced = self
            .clients
            .insert(record.client_id().to_string(), Arc::clone(&record));

        if let Some(previous) = displaced {
            tracing::warn!(
                client_id = %record.client_id(),
                connection_id = %record.connection_id(),
                displaced_connection_id = %previous.connection_id(),
                "Client id collision, replacing existing registration"
            );
            metrics::record_identity_collision();
        } else {
            metrics::client_connected();
        }

        tracing::info!(
            client_id = %record.client_id(),
            connection_id = %record.connection_id(),
            path = %request.path(),
            created_at = %record.created_at(),
            "Client connected"
        );

        record
    }

    /// Remove whatever is tracked under `client_id`. A no-op when absent.
    pub fn unregister(&self, client_id: &str, cause: DisconnectCause) -> Option<Arc<ClientRecord>> {
        match self.clients.remove(client_id) {
            Some((_, record)) => {
                self.on_removed(&record, &cause);
                Some(record)
            }
            None => {
                tracing::debug!(client_id = %client_id, cause = %cause, "Client not tracked, nothing to remove");
                None
            }
        }
    }

    /// Transport cleanup for one connection.
    ///
    /// Removes the entry only while it still belongs to this connection, so a
    /// connection displaced by a later registration cannot evict its successor.
    /// Returns whether an entry was removed.
    pub fn release(&self, record: &ClientRecord, cause: DisconnectCause) -> bool {
        let removed = self.clients.remove_if(record.client_id(), |_, current| {
            current.connection_id() == record.connection_id()
        });

        match removed {
            Some((_, removed)) => {
                self.on_removed(&removed, &cause);
                true
            }
            None => {
                record.connection().mark_released();
                tracing::debug!(
                    client_id = %record.client_id(),
                    connection_id = %record.connection_id(),
                    cause = %cause,
                    "Connection ended after its registration was already gone"
                );
                false
            }
        }
    }

    /// Administrative disconnect: untrack the client and ask its socket to close.
    pub fn disconnect(&self, client_id: &str, reason: &str) -> bool {
        let cause = DisconnectCause::Administrative(reason.to_string());
        match self.unregister(client_id, cause) {
            Some(record) => {
                record.connection().close(CLOSE_NORMAL, reason);
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, client_id: &str) -> Option<Arc<ClientRecord>> {
        self.clients
            .get(client_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Point-in-time listing, sorted by creation time.
    pub fn snapshot(&self) -> Vec<ClientSummary> {
        let mut clients: Vec<ClientSummary> = self
            .clients
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        clients.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        clients
    }

    fn on_removed(&self, record: &ClientRecord, cause: &DisconnectCause) {
        record.connection().mark_released();

        match cause {
            DisconnectCause::Error(_) => tracing::warn!(
                client_id = %record.client_id(),
                connection_id = %record.connection_id(),
                cause = %cause,
                "Client removed after transport error"
            ),
            _ => tracing::info!(
                client_id = %record.client_id(),
                connection_id = %record.connection_id(),
                cause = %cause,
                "Client removed from the active connection pool"
            ),
        }

        metrics::record_disconnect(cause);
        metrics::client_removed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;

    fn at(uri: &str) -> HandshakeRequest {
        HandshakeRequest::from_uri(uri.parse().unwrap())
    }

    fn closed() -> DisconnectCause {
        DisconnectCause::Closed {
            code: Some(1000),
            reason: String::new(),
        }
    }

    fn register(registry: &ConnectionRegistry, uri: &str) -> Arc<ClientRecord> {
        let (handle, _outbound) = ClientHandle::channel();
        registry.register(handle, &at(uri))
    }

    #[test]
    fn register_with_client_id() {
        let registry = ConnectionRegistry::new();
        let record = register(&registry, "/?clientId=abc");
        assert_eq!(record.client_id(), "abc");

        let found = registry.lookup("abc").unwrap();
        assert_eq!(found.connection_id(), record.connection_id());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_without_client_id_synthesizes() {
        let registry = ConnectionRegistry::new();
        let record = register(&registry, "/");
        let digits = record.client_id().strip_prefix("client_").unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert!(registry.contains(record.client_id()));
    }

    #[test]
    fn back_to_back_synthesized_ids_keep_integrity() {
        let registry = ConnectionRegistry::new();
        let first = register(&registry, "/");
        let second = register(&registry, "/");

        if first.client_id() == second.client_id() {
            assert_eq!(registry.len(), 1);
            let tracked = registry.lookup(first.client_id()).unwrap();
            assert_eq!(tracked.connection_id(), second.connection_id());
        } else {
            assert_eq!(registry.len(), 2);
            assert_eq!(
                registry.lookup(first.client_id()).unwrap().connection_id(),
                first.connection_id()
            );
            assert_eq!(
                registry.lookup(second.client_id()).unwrap().connection_id(),
                second.connection_id()
            );
        }
    }

    #[test]
    fn later_registration_wins() {
        let registry = ConnectionRegistry::new();
        let _first = register(&registry, "/?clientId=dup");
        let second = register(&registry, "/?clientId=dup");

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("dup").unwrap().connection_id(),
            second.connection_id()
        );
    }

    #[test]
    fn unregister_twice_is_noop() {
        let registry = ConnectionRegistry::new();
        let record = register(&registry, "/?clientId=abc");

        let removed = registry.unregister("abc", closed()).unwrap();
        assert_eq!(removed.connection_id(), record.connection_id());
        assert!(record.connection().is_released());

        assert!(registry.unregister("abc", DisconnectCause::Error("reset".into())).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        let _keep = register(&registry, "/?clientId=keep");
        assert!(registry.unregister("ghost", closed()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stale_release_keeps_newer_registration() {
        let registry = ConnectionRegistry::new();
        let first = register(&registry, "/?clientId=dup");
        let second = register(&registry, "/?clientId=dup");

        assert!(!registry.release(&first, closed()));
        assert!(first.connection().is_released());
        assert_eq!(
            registry.lookup("dup").unwrap().connection_id(),
            second.connection_id()
        );

        assert!(registry.release(&second, closed()));
        assert!(!registry.release(&second, DisconnectCause::Error("late".into())));
        assert!(registry.is_empty());
    }

    #[test]
    fn connected_gauge_follows_registry_size() {
        let registry = ConnectionRegistry::new();
        let rendered = crate::observability::metrics::render_with(|| {
            let first = register(&registry, "/?clientId=a");
            register(&registry, "/?clientId=b");
            register(&registry, "/?clientId=a");
            registry.release(&first, closed());
            registry.unregister("b", closed());
            registry.unregister("b", closed());
        });
        assert_eq!(registry.len(), 1);
        assert!(
            rendered.lines().any(|line| line == "gateway_connected_clients 1"),
            "{rendered}"
        );
    }

    #[test]
    fn disconnect_sends_close_frame() {
        let registry = ConnectionRegistry::new();
        let (handle, mut outbound) = ClientHandle::channel();
        let record = registry.register(handle, &at("/?clientId=abc"));

        assert!(registry.disconnect("abc", "maintenance"));
        assert!(!registry.contains("abc"));
        assert!(!record.connection().send_text("too late"));

        match outbound.try_recv().unwrap() {
            Message::Close(Some(frame)) => {
                assert_eq!(frame.code, CLOSE_NORMAL);
                assert_eq!(frame.reason.as_str(), "maintenance");
            }
            other => panic!("unexpected frame {other:?}"),
        }

        assert!(!registry.disconnect("abc", "again"));
    }

    #[test]
    fn snapshot_lists_all_clients() {
        let registry = ConnectionRegistry::new();
        let _a = register(&registry, "/?clientId=a");
        let _b = register(&registry, "/?clientId=b");

        let mut ids: Vec<String> = registry.snapshot().into_iter().map(|c| c.client_id).collect();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn cause_from_close_frame() {
        let cause = DisconnectCause::from_close_frame(Some(CloseFrame {
            code: 4001,
            reason: "going away".into(),
        }));
        assert_eq!(
            cause,
            DisconnectCause::Closed {
                code: Some(4001),
                reason: "going away".into()
            }
        );
        assert_eq!(cause.kind(), "close");
        assert_eq!(
            DisconnectCause::from_close_frame(None),
            DisconnectCause::Closed {
                code: None,
                reason: String::new()
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_register_unregister_keeps_integrity() {
        let registry = ConnectionRegistry::new();
        let total = 200;

        let mut tasks = Vec::new();
        for i in 0..total {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (handle, _outbound) = ClientHandle::channel();
                let uri = format!("/?clientId=c{i}");
                registry.register(handle, &at(&uri));
                tokio::task::yield_now().await;
                // Keep every fifth client.
                if i % 5 != 0 {
                    registry.unregister(&format!("c{i}"), DisconnectCause::Error("test".into()));
                    registry.unregister(&format!("c{i}"), DisconnectCause::Error("test".into()));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.len(), total / 5);
        for i in (0..total).step_by(5) {
            assert_eq!(registry.lookup(&format!("c{i}")).unwrap().client_id(), format!("c{i}"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_id_race_ends_in_a_defined_state() {
        for _ in 0..50 {
            let registry = ConnectionRegistry::new();
            let r1 = registry.clone();
            let r2 = registry.clone();

            let register = tokio::spawn(async move {
                let (handle, _outbound) = ClientHandle::channel();
                r1.register(handle, &at("/?clientId=race")).connection_id()
            });
            let unregister = tokio::spawn(async move {
                r2.unregister("race", closed());
            });

            let registered = register.await.unwrap();
            unregister.await.unwrap();

            match registry.lookup("race") {
                Some(record) => {
                    assert_eq!(record.connection_id(), registered);
                    assert_eq!(registry.len(), 1);
                }
                None => assert!(registry.is_empty()),
            }
        }
    }
}
