//! Per-connection bookkeeping tracked by the registry.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use crate::connection::ConnectionHandle;

/// Registry entry for one attached connection.
///
/// The delivery lock guarantees at most one in-flight write to the
/// connection at a time; the `closed` flag makes tear-down idempotent —
/// once set, no delivery attempt writes to the connection again.
pub(crate) struct ClientEntry {
    handle: ConnectionHandle,
    delivery: Mutex<()>,
    closed: AtomicBool,
    in_flight: AtomicUsize,
    dropped: AtomicU64,
}

impl ClientEntry {
    pub(crate) fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            delivery: Mutex::new(()),
            closed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Acquire the delivery lock. Writes and `closed` transitions only
    /// happen while holding this.
    pub(crate) async fn delivery_lock(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().await
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the entry closed. Callers must hold the delivery lock.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Reserve an in-flight delivery slot; `false` when the per-connection
    /// cap is already reached.
    pub(crate) fn begin_delivery(&self, max_in_flight: usize) -> bool {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max_in_flight).then_some(n + 1)
            })
            .is_ok()
    }

    pub(crate) fn end_delivery(&self) {
        let _ = self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    /// Count one dropped event for this connection; returns the new total.
    pub(crate) fn count_drop(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Close the connection if it isn't closed already.
    ///
    /// Takes the delivery lock so an in-flight write finishes (or fails)
    /// before the socket goes away underneath it.
    pub(crate) async fn close_now(&self) {
        let _guard = self.delivery.lock().await;
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.handle.connection().close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use crate::connection::{ConnectionError, FeedConnection};

    #[derive(Default)]
    struct CountingConnection {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl FeedConnection for CountingConnection {
        async fn send(&self, _frame: &str) -> Result<(), ConnectionError> {
            Ok(())
        }
        async fn close(&self) {
            let _ = self.closes.fetch_add(1, Ordering::SeqCst);
        }
        fn peer_addr(&self) -> Option<SocketAddr> {
            None
        }
    }

    fn make_entry() -> (ClientEntry, Arc<CountingConnection>) {
        let conn = Arc::new(CountingConnection::default());
        let entry = ClientEntry::new(ConnectionHandle::new(conn.clone()));
        (entry, conn)
    }

    #[tokio::test]
    async fn close_now_closes_once() {
        let (entry, conn) = make_entry();
        assert!(!entry.is_closed());
        entry.close_now().await;
        entry.close_now().await;
        assert!(entry.is_closed());
        assert_eq!(conn.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn in_flight_cap_enforced() {
        let (entry, _conn) = make_entry();
        assert!(entry.begin_delivery(2));
        assert!(entry.begin_delivery(2));
        assert!(!entry.begin_delivery(2));
        entry.end_delivery();
        assert!(entry.begin_delivery(2));
    }

    #[test]
    fn drop_counter_accumulates() {
        let (entry, _conn) = make_entry();
        assert_eq!(entry.count_drop(), 1);
        assert_eq!(entry.count_drop(), 2);
    }
}
