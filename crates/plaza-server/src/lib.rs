//! # plaza-server
//!
//! Axum HTTP + `WebSocket` server for the Plaza feed.
//!
//! - Auth endpoints: signup, login, user status
//! - Feed endpoints: paginated listing and post CRUD
//! - `/ws`: feed subscription — every attached peer receives each post
//!   mutation as a JSON frame, via the `plaza-hub` broadcast hub
//! - `/health`: liveness plus hub counters
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod health;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod websocket;

pub use server::{PlazaServer, ServerError};
pub use state::AppState;
