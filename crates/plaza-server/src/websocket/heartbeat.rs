//! Heartbeat ping/pong liveness monitoring.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use super::socket::WsConnection;

/// Why the heartbeat loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The peer stopped responding within the timeout window.
    TimedOut,
    /// A ping could not be written (socket already closed).
    PingFailed,
}

/// Ping the peer every `interval`; give up after `timeout` of silence.
///
/// At each tick the liveness flag (set by the read loop on any inbound
/// frame) is checked and reset. `timeout / interval` consecutive silent
/// ticks (at least 1) end the loop with [`HeartbeatResult::TimedOut`].
pub async fn run_heartbeat(
    connection: Arc<WsConnection>,
    interval: Duration,
    timeout: Duration,
) -> HeartbeatResult {
    let mut ticker = time::interval(interval);
    let mut missed: u32 = 0;
    let interval_secs = interval.as_secs().max(1);
    #[allow(clippy::cast_possible_truncation)]
    let max_missed = (timeout.as_secs() / interval_secs).max(1) as u32;

    loop {
        let _ = ticker.tick().await;
        if connection.check_alive() {
            missed = 0;
        } else {
            missed += 1;
            if missed >= max_missed {
                return HeartbeatResult::TimedOut;
            }
        }
        if connection.ping().await.is_err() {
            return HeartbeatResult::PingFailed;
        }
    }
}
