//! The coordinator — the one task allowed to touch the registry.
//!
//! Register/unregister/publish requests from any number of callers arrive
//! on a single control channel and are applied one at a time, which is what
//! makes the registry lock-free. Publishing takes a snapshot of the current
//! entries and spawns one delivery task per live connection; the coordinator
//! never awaits a network write, so a stuck peer cannot stall registration
//! traffic or other peers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use plaza_core::{BroadcastEvent, ConnectionId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::ConnectionHandle;
use crate::entry::ClientEntry;
use crate::hub::{HubConfig, HubStats};

/// A control request submitted to the coordinator.
pub(crate) enum HubCommand {
    /// Attach a connection to the registry.
    Register(ConnectionHandle),
    /// Remove a connection and close it. No-op when already gone.
    Unregister(ConnectionId),
    /// Fan an event out to the current registry snapshot.
    Publish(BroadcastEvent),
}

pub(crate) struct Coordinator {
    rx: mpsc::Receiver<HubCommand>,
    /// Used by delivery tasks to submit unregister requests on write failure.
    feedback: mpsc::Sender<HubCommand>,
    registry: HashMap<ConnectionId, Arc<ClientEntry>>,
    config: HubConfig,
    stats: Arc<HubStats>,
    cancel: CancellationToken,
}

impl Coordinator {
    pub(crate) fn new(
        rx: mpsc::Receiver<HubCommand>,
        feedback: mpsc::Sender<HubCommand>,
        config: HubConfig,
        stats: Arc<HubStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            rx,
            feedback,
            registry: HashMap::new(),
            config,
            stats,
            cancel,
        }
    }

    /// Run the control loop until the hub is shut down.
    #[tracing::instrument(skip_all, name = "feed_hub")]
    pub(crate) async fn run(mut self) {
        loop {
            let cmd = tokio::select! {
                () = self.cancel.cancelled() => break,
                cmd = self.rx.recv() => cmd,
            };
            match cmd {
                Some(cmd) => self.handle(cmd),
                None => break,
            }
        }
        self.close_all().await;
    }

    /// Apply one control request. Never awaits network I/O.
    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register(handle) => self.register(handle),
            HubCommand::Unregister(id) => self.unregister(&id),
            HubCommand::Publish(event) => self.publish(&event),
        }
    }

    fn register(&mut self, handle: ConnectionHandle) {
        let id = handle.id().clone();
        let peer = handle.peer_addr();
        let entry = Arc::new(ClientEntry::new(handle));
        if let Some(old) = self.registry.insert(id.clone(), entry) {
            // Same id attached twice: the newer handle wins, the superseded
            // entry is closed off the control path.
            warn!(conn_id = %id, "re-register replaced an existing entry");
            drop(tokio::spawn(async move { old.close_now().await }));
        } else {
            info!(conn_id = %id, peer = ?peer, "connection registered");
        }
        self.stats.set_connections(self.registry.len());
    }

    fn unregister(&mut self, id: &ConnectionId) {
        match self.registry.remove(id) {
            Some(entry) => {
                info!(conn_id = %id, "connection unregistered");
                drop(tokio::spawn(async move { entry.close_now().await }));
            }
            // Already removed (peer disconnect raced a write failure).
            None => debug!(conn_id = %id, "unregister for unknown connection"),
        }
        self.stats.set_connections(self.registry.len());
    }

    fn publish(&mut self, event: &BroadcastEvent) {
        let frame: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(action = event.action.as_str(), error = %e, "failed to serialize event");
                return;
            }
        };

        let mut recipients = 0usize;
        for entry in self.registry.values() {
            if entry.is_closed() {
                continue;
            }
            if !entry.begin_delivery(self.config.max_in_flight_per_connection) {
                let total = entry.count_drop();
                self.stats.count_dropped_delivery();
                warn!(
                    conn_id = %entry.handle().id(),
                    total_drops = total,
                    "connection delivery queue full, dropping event"
                );
                continue;
            }
            recipients += 1;
            drop(tokio::spawn(deliver(
                entry.clone(),
                Arc::clone(&frame),
                self.config.delivery_timeout,
                self.feedback.clone(),
            )));
        }
        debug!(
            action = event.action.as_str(),
            post_id = %event.post.id,
            recipients,
            "broadcast event"
        );
    }

    /// Close every connection. Runs once, when the hub shuts down.
    async fn close_all(mut self) {
        let entries: Vec<_> = self.registry.drain().map(|(_, e)| e).collect();
        if !entries.is_empty() {
            info!(connections = entries.len(), "closing all connections");
        }
        futures::future::join_all(entries.iter().map(|e| e.close_now())).await;
        self.stats.set_connections(0);
    }
}

/// One delivery attempt: write one event frame to one connection.
///
/// Serialized against other attempts on the same connection by the entry's
/// delivery lock. On write failure or deadline expiry the entry is marked
/// closed, the connection is closed, and an unregister request is submitted
/// back to the coordinator.
async fn deliver(
    entry: Arc<ClientEntry>,
    frame: Arc<str>,
    deadline: Duration,
    feedback: mpsc::Sender<HubCommand>,
) {
    let failed = {
        let _guard = entry.delivery_lock().await;
        if entry.is_closed() {
            entry.end_delivery();
            return;
        }
        match tokio::time::timeout(deadline, entry.handle().connection().send(&frame)).await {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                warn!(conn_id = %entry.handle().id(), error = %e, "write failed, closing connection");
                entry.mark_closed();
                entry.handle().connection().close().await;
                true
            }
            Err(_) => {
                warn!(
                    conn_id = %entry.handle().id(),
                    timeout_ms = deadline.as_millis(),
                    "write deadline exceeded, closing connection"
                );
                entry.mark_closed();
                entry.handle().connection().close().await;
                true
            }
        }
    };
    entry.end_delivery();
    if failed {
        // The hub may be shutting down; the entry is already closed either way.
        let _ = feedback
            .send(HubCommand::Unregister(entry.handle().id().clone()))
            .await;
    }
}
