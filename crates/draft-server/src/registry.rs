//! Connection registry and state fan-out.
//!
//! The registry tracks membership only. It never owns a socket: each
//! entry is a [`Sendable`] that enqueues a frame without blocking, and
//! the transport decides how that queue reaches the wire. A delivery
//! failure removes the entry, so dead or slow peers fall out of the set
//! on the next broadcast.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use draft_types::ConnectionId;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Why a frame could not be handed to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The client's outbound queue is full.
    #[error("outbound queue full")]
    Full,
    /// The client's writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// Something the registry can push frames to.
///
/// Implementations must return immediately; a client that cannot accept
/// a frame right now reports an error and is dropped by the registry.
pub trait Sendable: Send + Sync {
    /// Hand one encoded frame to the client.
    fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError>;
}

/// [`Sendable`] backed by a bounded queue that a writer task drains.
#[derive(Debug, Clone)]
pub struct ClientChannel {
    tx: mpsc::Sender<Arc<str>>,
}

impl ClientChannel {
    /// Wrap the sending half of a client's outbound queue.
    pub const fn new(tx: mpsc::Sender<Arc<str>>) -> Self {
        Self { tx }
    }
}

impl Sendable for ClientChannel {
    fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Public view of one registered connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    /// Registry handle.
    pub id: ConnectionId,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
}

/// Result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections that accepted the frame.
    pub delivered: usize,
    /// Connections that failed and were unregistered.
    pub dropped: Vec<ConnectionId>,
}

struct Entry {
    sink: Arc<dyn Sendable>,
    connected_at: DateTime<Utc>,
}

/// The set of live client channels.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Entry>>,
    /// Mirrors `connections.len()` so counts don't need the lock.
    active_count: AtomicUsize,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Start tracking a client. Call only after the transport handshake
    /// has completed.
    pub async fn register(&self, sink: Arc<dyn Sendable>) -> ConnectionId {
        let id = ConnectionId::new();
        let entry = Entry {
            sink,
            connected_at: Utc::now(),
        };
        let mut conns = self.connections.write().await;
        if conns.insert(id, entry).is_none() {
            let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        }
        debug!(conn_id = %id, active = conns.len(), "connection registered");
        id
    }

    /// Stop tracking a client. Returns `false` if it was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut conns = self.connections.write().await;
        let removed = conns.remove(&id).is_some();
        if removed {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
            debug!(conn_id = %id, active = conns.len(), "connection unregistered");
        }
        removed
    }

    /// Deliver `frame` to every registered client.
    ///
    /// Each client is attempted independently. Clients that fail are
    /// unregistered once the loop is done; the others are unaffected.
    pub async fn broadcast(&self, frame: Arc<str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        {
            let conns = self.connections.read().await;
            for (id, entry) in &*conns {
                match entry.sink.deliver(Arc::clone(&frame)) {
                    Ok(()) => report.delivered = report.delivered.saturating_add(1),
                    Err(e) => {
                        warn!(conn_id = %id, error = %e, "dropping client after failed delivery");
                        report.dropped.push(*id);
                    }
                }
            }
        }
        for id in &report.dropped {
            let _ = self.unregister(*id).await;
        }
        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "broadcast frame"
        );
        report
    }

    /// Deliver `frame` to one client. A failure unregisters it.
    ///
    /// Returns `true` if the frame was accepted.
    pub async fn send_to(&self, id: ConnectionId, frame: Arc<str>) -> bool {
        let result = {
            let conns = self.connections.read().await;
            match conns.get(&id) {
                Some(entry) => entry.sink.deliver(frame),
                None => return false,
            }
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(conn_id = %id, error = %e, "dropping client after failed delivery");
                let _ = self.unregister(id).await;
                false
            }
        }
    }

    #[cfg(test)]
    async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Number of registered clients.
    pub fn connection_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    /// All registered clients, oldest first.
    pub async fn connections(&self) -> Vec<ConnectionInfo> {
        let conns = self.connections.read().await;
        let mut list: Vec<ConnectionInfo> = conns
            .iter()
            .map(|(id, entry)| ConnectionInfo {
                id: *id,
                connected_at: entry.connected_at,
            })
            .collect();
        list.sort_by_key(|info| info.id);
        list
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A sink that always fails with the given error.
    struct Broken(DeliveryError);

    impl Sendable for Broken {
        fn deliver(&self, _frame: Arc<str>) -> Result<(), DeliveryError> {
            Err(self.0)
        }
    }

    fn channel(capacity: usize) -> (Arc<dyn Sendable>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(ClientChannel::new(tx)), rx)
    }

    fn frame(text: &str) -> Arc<str> {
        Arc::from(text)
    }

    #[tokio::test]
    async fn register_and_unregister() {
        let registry = ConnectionRegistry::new();
        let (sink, _rx) = channel(4);
        let id = registry.register(sink).await;
        assert_eq!(registry.connection_count(), 1);
        assert!(registry.contains(id).await);

        assert!(registry.unregister(id).await);
        assert_eq!(registry.connection_count(), 0);
        assert!(!registry.contains(id).await);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (sink, _rx) = channel(4);
        let id = registry.register(sink).await;
        assert!(registry.unregister(id).await);
        assert!(!registry.unregister(id).await);
        assert!(!registry.unregister(ConnectionId::new()).await);
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn same_sink_registered_twice_gets_two_handles() {
        let registry = ConnectionRegistry::new();
        let (sink, mut rx) = channel(4);
        let a = registry.register(Arc::clone(&sink)).await;
        let b = registry.register(sink).await;
        assert_ne!(a, b);

        let report = registry.broadcast(frame("x")).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(&*rx.recv().await.unwrap(), "x");
        assert_eq!(&*rx.recv().await.unwrap(), "x");
    }

    #[tokio::test]
    async fn broadcast_reaches_every_client_once() {
        let registry = ConnectionRegistry::new();
        let (s1, mut r1) = channel(4);
        let (s2, mut r2) = channel(4);
        let _ = registry.register(s1).await;
        let _ = registry.register(s2).await;

        let report = registry.broadcast(frame("hello")).await;
        assert_eq!(report.delivered, 2);
        assert!(report.dropped.is_empty());

        assert_eq!(&*r1.try_recv().unwrap(), "hello");
        assert_eq!(&*r2.try_recv().unwrap(), "hello");
        assert!(r1.try_recv().is_err());
        assert!(r2.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregistered_client_receives_nothing() {
        let registry = ConnectionRegistry::new();
        let (s1, mut r1) = channel(4);
        let (s2, mut r2) = channel(4);
        let gone = registry.register(s1).await;
        let _ = registry.register(s2).await;
        let _ = registry.unregister(gone).await;

        let report = registry.broadcast(frame("only one")).await;
        assert_eq!(report.delivered, 1);
        assert!(r1.try_recv().is_err());
        assert_eq!(&*r2.try_recv().unwrap(), "only one");
    }

    #[tokio::test]
    async fn failing_client_is_dropped_without_affecting_others() {
        let registry = ConnectionRegistry::new();
        let (good, mut rx) = channel(4);
        let _ = registry.register(good).await;
        let closed = registry.register(Arc::new(Broken(DeliveryError::Closed))).await;
        let full = registry.register(Arc::new(Broken(DeliveryError::Full))).await;

        let report = registry.broadcast(frame("state")).await;
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped.len(), 2);
        assert!(report.dropped.contains(&closed));
        assert!(report.dropped.contains(&full));
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(&*rx.try_recv().unwrap(), "state");

        // Self-healed: the next broadcast has nothing to drop.
        let report = registry.broadcast(frame("again")).await;
        assert_eq!(report.delivered, 1);
        assert!(report.dropped.is_empty());
    }

    #[tokio::test]
    async fn slow_client_is_dropped_when_queue_fills() {
        let registry = ConnectionRegistry::new();
        let (slow, mut slow_rx) = channel(1);
        let (fast, mut fast_rx) = channel(8);
        let slow_id = registry.register(slow).await;
        let _ = registry.register(fast).await;

        let _ = registry.broadcast(frame("1")).await;
        let report = registry.broadcast(frame("2")).await;
        assert_eq!(report.dropped, vec![slow_id]);
        assert!(!registry.contains(slow_id).await);

        assert_eq!(&*fast_rx.recv().await.unwrap(), "1");
        assert_eq!(&*fast_rx.recv().await.unwrap(), "2");
        assert_eq!(&*slow_rx.recv().await.unwrap(), "1");
        // The registry held the last sender, so the queue is now closed.
        assert!(slow_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn closed_receiver_is_detected() {
        let registry = ConnectionRegistry::new();
        let (sink, rx) = channel(4);
        let id = registry.register(sink).await;
        drop(rx);

        let report = registry.broadcast(frame("x")).await;
        assert_eq!(report.dropped, vec![id]);
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn send_to_targets_one_client() {
        let registry = ConnectionRegistry::new();
        let (s1, mut r1) = channel(4);
        let (s2, mut r2) = channel(4);
        let id1 = registry.register(s1).await;
        let _ = registry.register(s2).await;

        assert!(registry.send_to(id1, frame("direct")).await);
        assert_eq!(&*r1.try_recv().unwrap(), "direct");
        assert!(r2.try_recv().is_err());

        assert!(!registry.send_to(ConnectionId::new(), frame("nobody")).await);
    }

    #[tokio::test]
    async fn send_to_failure_unregisters() {
        let registry = ConnectionRegistry::new();
        let id = registry.register(Arc::new(Broken(DeliveryError::Closed))).await;
        assert!(!registry.send_to(id, frame("x")).await);
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn connections_lists_registered_handles() {
        let registry = ConnectionRegistry::new();
        let (s1, _r1) = channel(4);
        let (s2, _r2) = channel(4);
        let a = registry.register(s1).await;
        let b = registry.register(s2).await;

        let list = registry.connections().await;
        let ids: Vec<ConnectionId> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }
}
