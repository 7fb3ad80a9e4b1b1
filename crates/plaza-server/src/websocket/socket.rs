//! WebSocket transport adapter for the hub's connection seam.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::SinkExt;
use futures::stream::SplitSink;
use plaza_hub::{ConnectionError, FeedConnection};
use tokio::sync::Mutex;

/// One peer's write half plus liveness state.
///
/// The sink mutex makes each frame write atomic; the hub's per-connection
/// delivery lock already serializes event frames, the mutex additionally
/// keeps heartbeat pings from splitting one.
pub struct WsConnection {
    peer: SocketAddr,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    alive: AtomicBool,
}

impl WsConnection {
    /// Wrap the write half of an upgraded socket.
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>, peer: SocketAddr) -> Self {
        Self {
            peer,
            sink: Mutex::new(sink),
            alive: AtomicBool::new(true),
        }
    }

    /// Send a heartbeat ping.
    pub async fn ping(&self) -> Result<(), ConnectionError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))
    }

    /// Record peer activity (pong or any inbound frame).
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Check and reset the liveness flag.
    ///
    /// Returns `true` when the peer showed activity since the last check.
    pub fn check_alive(&self) -> bool {
        self.alive.swap(false, Ordering::Relaxed)
    }
}

#[async_trait]
impl FeedConnection for WsConnection {
    async fn send(&self, frame: &str) -> Result<(), ConnectionError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(frame.to_owned().into()))
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))
    }

    async fn close(&self) {
        let mut sink = self.sink.lock().await;
        // The peer may already be gone; nothing to do about a failed close.
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
