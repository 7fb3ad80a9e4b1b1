//! Public hub API.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use plaza_core::{BroadcastEvent, ConnectionId};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionHandle;
use crate::coordinator::{Coordinator, HubCommand};

/// Tuning knobs for a hub instance.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Capacity of the control channel. When full, callers of
    /// [`FeedHub::publish`] / attach / detach wait (backpressure — nothing
    /// is silently dropped).
    pub control_queue_capacity: usize,
    /// Deadline for a single write to a single connection. A connection
    /// that can't take a frame within this window is closed and removed.
    pub delivery_timeout: Duration,
    /// Maximum concurrent in-flight deliveries per connection. Events past
    /// the cap are dropped for that connection only, and counted.
    pub max_in_flight_per_connection: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            control_queue_capacity: 256,
            delivery_timeout: Duration::from_secs(10),
            max_in_flight_per_connection: 32,
        }
    }
}

/// Live counters, readable without touching the coordinator.
#[derive(Default)]
pub(crate) struct HubStats {
    connections: AtomicUsize,
    dropped_deliveries: AtomicU64,
}

impl HubStats {
    pub(crate) fn set_connections(&self, n: usize) {
        self.connections.store(n, Ordering::Relaxed);
    }

    pub(crate) fn connections(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    pub(crate) fn count_dropped_delivery(&self) {
        let _ = self.dropped_deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped_deliveries(&self) -> u64 {
        self.dropped_deliveries.load(Ordering::Relaxed)
    }
}

/// The hub stopped accepting requests.
#[derive(Debug, Error)]
pub enum HubError {
    /// The hub has shut down; the request was not accepted.
    #[error("feed hub is shut down")]
    Closed,
}

/// Handle to a running broadcast hub.
///
/// Cheap to clone; every clone talks to the same coordinator. Construct one
/// per process — or several in tests, they are fully isolated.
///
/// Ordering: events reach each connection in the order `publish` calls are
/// accepted by the coordinator. Under delivery-lock contention the write
/// order for a single connection may deviate from publish order; peers that
/// need a strict total order should not rely on the hub for it.
#[derive(Clone)]
pub struct FeedHub {
    tx: mpsc::Sender<HubCommand>,
    stats: Arc<HubStats>,
    cancel: CancellationToken,
}

impl FeedHub {
    /// Start a hub with the given configuration.
    ///
    /// Returns the handle and the coordinator task's join handle; await the
    /// latter after [`FeedHub::shutdown`] to wait for connections to close.
    #[must_use]
    pub fn spawn(config: HubConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.control_queue_capacity);
        let stats = Arc::new(HubStats::default());
        let cancel = CancellationToken::new();
        let coordinator = Coordinator::new(rx, tx.clone(), config, stats.clone(), cancel.clone());
        let join = tokio::spawn(coordinator.run());
        (Self { tx, stats, cancel }, join)
    }

    /// Attach a connection. Always succeeds while the hub is running; a
    /// handle attached twice replaces its previous registration.
    pub async fn attach(&self, handle: ConnectionHandle) -> Result<(), HubError> {
        self.submit(HubCommand::Register(handle)).await
    }

    /// Detach a connection, closing it. No-op when the connection is
    /// already gone, so the disconnect path and the write-failure path can
    /// both call it.
    pub async fn detach(&self, id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubCommand::Unregister(id)).await
    }

    /// Publish an event to every live connection.
    ///
    /// Returns once the event is accepted by the coordinator; delivery runs
    /// asynchronously and is best-effort. Callers don't see (and cannot
    /// depend on) how many connections exist.
    pub async fn publish(&self, event: BroadcastEvent) -> Result<(), HubError> {
        self.submit(HubCommand::Publish(event)).await
    }

    /// Number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.stats.connections()
    }

    /// Total events dropped because a connection's delivery queue was full.
    #[must_use]
    pub fn dropped_deliveries(&self) -> u64 {
        self.stats.dropped_deliveries()
    }

    /// Stop the coordinator and close every connection.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether [`FeedHub::shutdown`] has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn submit(&self, cmd: HubCommand) -> Result<(), HubError> {
        if self.cancel.is_cancelled() {
            return Err(HubError::Closed);
        }
        self.tx.send(cmd).await.map_err(|_| HubError::Closed)
    }
}
