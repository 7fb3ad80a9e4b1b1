//! Connection handles and the transport seam.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use plaza_core::ConnectionId;
use thiserror::Error;

/// A write to a peer connection failed.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer is gone (socket closed or reset).
    #[error("connection is closed")]
    Closed,
    /// Any other transport-level write failure.
    #[error("write failed: {0}")]
    Io(String),
}

/// One live duplex peer connection, as the hub sees it.
///
/// Implemented by the transport layer (the WebSocket adapter in
/// `plaza-server`, mocks in tests). `send` writes exactly one text frame
/// and reports failure; it is *not* required to be safe against concurrent
/// callers — the hub serializes all writes to a connection through the
/// per-connection delivery lock.
#[async_trait]
pub trait FeedConnection: Send + Sync {
    /// Write one frame to the peer.
    async fn send(&self, frame: &str) -> Result<(), ConnectionError>;

    /// Close the underlying connection. Must be idempotent.
    async fn close(&self);

    /// Peer address, when the transport knows it (for logging only).
    fn peer_addr(&self) -> Option<SocketAddr>;
}

/// Identity plus transport for one peer.
///
/// Created by the accept path, owned by the registry once attached.
/// Identity is the [`ConnectionId`]: no two live handles compare equal, and
/// a reconnecting peer gets a brand-new handle.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    conn: Arc<dyn FeedConnection>,
}

impl ConnectionHandle {
    /// Wrap a transport connection with a fresh identity.
    #[must_use]
    pub fn new(conn: Arc<dyn FeedConnection>) -> Self {
        Self {
            id: ConnectionId::new(),
            conn,
        }
    }

    /// This handle's identity.
    #[must_use]
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Peer address, when known.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.peer_addr()
    }

    pub(crate) fn connection(&self) -> &Arc<dyn FeedConnection> {
        &self.conn
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("peer_addr", &self.conn.peer_addr())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullConnection;

    #[async_trait]
    impl FeedConnection for NullConnection {
        async fn send(&self, _frame: &str) -> Result<(), ConnectionError> {
            Ok(())
        }
        async fn close(&self) {}
        fn peer_addr(&self) -> Option<SocketAddr> {
            None
        }
    }

    #[test]
    fn handles_get_distinct_ids() {
        let a = ConnectionHandle::new(Arc::new(NullConnection));
        let b = ConnectionHandle::new(Arc::new(NullConnection));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_preserves_identity() {
        let a = ConnectionHandle::new(Arc::new(NullConnection));
        let b = a.clone();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn debug_does_not_panic() {
        let handle = ConnectionHandle::new(Arc::new(NullConnection));
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("ConnectionHandle"));
    }
}
