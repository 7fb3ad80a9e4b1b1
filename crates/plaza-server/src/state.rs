//! Shared state accessible from Axum handlers.

use std::sync::Arc;
use std::time::Instant;

use plaza_hub::FeedHub;
use plaza_settings::PlazaSettings;
use plaza_store::{PostRepository, UserRepository};

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    /// The broadcast hub behind `/ws`.
    pub hub: FeedHub,
    /// User accounts.
    pub users: UserRepository,
    /// Feed posts.
    pub posts: PostRepository,
    /// Loaded settings.
    pub settings: Arc<PlazaSettings>,
    /// When the server started (for `/health` uptime).
    pub start_time: Instant,
}
