//! Live client registry and notification fan-out.
//!
//! The hub owns the set of open browser connections. Each connection is a
//! [`ClientSink`]; for real sockets that is the sending half of a bounded
//! queue drained by the socket's writer task.
//!
//! Delivery is at-most-once: a closed or backed-up client is skipped, never
//! retried, and never affects delivery to the others.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use super::event::Notification;

/// Maximum number of notifications queued per client before sends are dropped.
pub const CLIENT_QUEUE_CAPACITY: usize = 64;

/// Identifier assigned to a connection on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client_{}", self.0)
    }
}

/// Why a send to one client did not happen.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("client connection closed")]
    Closed,
    #[error("client send queue full")]
    Full,
}

/// One end of a client connection that text frames can be pushed into.
pub trait ClientSink: Send + Sync {
    /// Whether the connection is still open.
    fn is_open(&self) -> bool;

    /// Queue a text frame without waiting.
    fn send_text(&self, text: &str) -> Result<(), SinkError>;
}

impl ClientSink for mpsc::Sender<String> {
    fn is_open(&self) -> bool {
        !self.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), SinkError> {
        self.try_send(text.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients the frame was queued for
    pub delivered: usize,
    /// Clients skipped because they were no longer open
    pub skipped: usize,
    /// Open clients whose send failed
    pub failed: usize,
}

/// Shared registry of live connections.
///
/// Cheap to clone; all clones share the same set.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    clients: RwLock<HashMap<ClientId, Arc<dyn ClientSink>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new socket and return its ID plus the queue its writer drains.
    pub async fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        let id = self.register_sink(Arc::new(tx)).await;
        (id, rx)
    }

    /// Register an arbitrary sink.
    pub async fn register_sink(&self, sink: Arc<dyn ClientSink>) -> ClientId {
        let id = ClientId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut clients = self.inner.clients.write().await;
        clients.insert(id, sink);
        info!(client_id = %id, clients = clients.len(), "client_registered");
        id
    }

    /// Remove a client. Returns false if it was already gone.
    pub async fn unregister(&self, id: ClientId) -> bool {
        let mut clients = self.inner.clients.write().await;
        let removed = clients.remove(&id).is_some();
        if removed {
            info!(client_id = %id, clients = clients.len(), "client_unregistered");
        }
        removed
    }

    /// Number of registered connections.
    pub async fn count(&self) -> usize {
        self.inner.clients.read().await.len()
    }

    /// Serialize a notification once and push it to every open client.
    pub async fn broadcast(
        &self,
        notification: &Notification,
    ) -> Result<BroadcastReport, serde_json::Error> {
        let text = serde_json::to_string(notification)?;
        let report = self.broadcast_text(&text).await;

        info!(
            kind = notification.kind(),
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "notification_broadcast"
        );

        Ok(report)
    }

    /// Push a raw text frame to every open client.
    pub async fn broadcast_text(&self, text: &str) -> BroadcastReport {
        let clients = self.inner.clients.read().await;
        let mut report = BroadcastReport::default();

        for (id, sink) in clients.iter() {
            if !sink.is_open() {
                report.skipped += 1;
                continue;
            }

            match sink.send_text(text) {
                Ok(()) => report.delivered += 1,
                Err(SinkError::Closed) => {
                    debug!(client_id = %id, "client_closed_during_broadcast");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(client_id = %id, error = %e, "client_send_failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Drop every registered client. Socket writers see their queue close and
    /// send a close frame.
    pub async fn close_all(&self) -> usize {
        let mut clients = self.inner.clients.write().await;
        let closed = clients.len();
        clients.clear();
        info!(closed = closed, "clients_closed");
        closed
    }
}
