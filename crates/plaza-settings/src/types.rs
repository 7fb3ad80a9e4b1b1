//! Settings types with compiled defaults.

use serde::{Deserialize, Serialize};

/// Top-level settings for the Plaza backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlazaSettings {
    /// HTTP/WebSocket server settings.
    pub server: ServerSettings,
    /// Broadcast hub tuning.
    pub hub: HubSettings,
    /// Token signing settings.
    pub auth: AuthSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

/// HTTP/WebSocket server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8000`; `0` auto-assigns).
    pub port: u16,
    /// Posts per feed page (default `2`).
    pub page_size: u64,
    /// Heartbeat ping interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Close a connection after this many seconds without a pong.
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            page_size: 2,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

/// Broadcast hub tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HubSettings {
    /// Control channel capacity; producers wait when it's full.
    pub control_queue_capacity: usize,
    /// Per-delivery write deadline in seconds.
    pub delivery_timeout_secs: u64,
    /// Max concurrent in-flight deliveries per connection.
    pub max_in_flight_per_connection: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            control_queue_capacity: 256,
            delivery_timeout_secs: 10,
            max_in_flight_per_connection: 32,
        }
    }
}

/// Token signing settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthSettings {
    /// HMAC secret for session tokens. The compiled default is for local
    /// development only; set `PLAZA_TOKEN_SECRET` in production.
    pub token_secret: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_secret: "plaza-dev-secret".into(),
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingSettings {
    /// Default tracing filter (overridden by `RUST_LOG`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}
