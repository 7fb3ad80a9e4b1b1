//! `/ws` — the feed subscription endpoint.
//!
//! Lifecycle per peer: upgrade → attach to the hub → sit in a read loop
//! (peers send nothing meaningful; inbound frames only feed the liveness
//! flag) alongside a heartbeat loop → on either loop ending, detach and
//! close. Detach is idempotent with the hub's own failure cleanup, so a
//! peer that died mid-broadcast is removed exactly once.
//!
//! Subscribers receive only events published while they are connected; no
//! backlog is replayed on attach.

pub mod heartbeat;
pub mod socket;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures::StreamExt;
use futures::stream::SplitStream;
use plaza_hub::ConnectionHandle;
use tracing::{debug, info};

use self::heartbeat::run_heartbeat;
use self::socket::WsConnection;
use crate::state::AppState;

/// GET /ws — upgrade and hand the socket to the feed lifecycle.
pub async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, peer))
}

async fn handle_socket(socket: WebSocket, state: AppState, peer: SocketAddr) {
    let (sink, mut stream) = socket.split();
    let conn = Arc::new(WsConnection::new(sink, peer));
    let handle = ConnectionHandle::new(conn.clone());
    let conn_id = handle.id().clone();

    if state.hub.attach(handle).await.is_err() {
        // Hub is shutting down; the upgrade loses the race.
        debug!(%peer, "connection refused, hub shut down");
        return;
    }
    info!(conn_id = %conn_id, %peer, "feed connection established");

    let interval = Duration::from_secs(state.settings.server.heartbeat_interval_secs);
    let timeout = Duration::from_secs(state.settings.server.heartbeat_timeout_secs);

    let reason;
    tokio::select! {
        r = read_loop(&mut stream, &conn) => reason = r,
        r = run_heartbeat(conn.clone(), interval, timeout) => {
            reason = match r {
                heartbeat::HeartbeatResult::TimedOut => "heartbeat timeout",
                heartbeat::HeartbeatResult::PingFailed => "ping failed",
            };
        }
    }

    let _ = state.hub.detach(conn_id.clone()).await;
    info!(conn_id = %conn_id, %peer, reason, "feed connection closed");
}

/// Consume inbound frames until the peer goes away.
async fn read_loop(stream: &mut SplitStream<WebSocket>, conn: &WsConnection) -> &'static str {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(_)) => return "peer closed",
            // Pongs and any other inbound traffic count as liveness.
            Ok(_) => conn.mark_alive(),
            Err(_) => return "read error",
        }
    }
    "stream ended"
}
