//! `PlazaServer` — router assembly and the listen loop.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::health::{self, HealthResponse};
use crate::routes;
use crate::state::AppState;
use crate::websocket;

/// The server failed to start.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind the listen address.
    #[error("bind failed: {0}")]
    Bind(#[from] std::io::Error),
}

/// The Plaza HTTP + WebSocket server.
pub struct PlazaServer {
    state: AppState,
}

impl PlazaServer {
    /// Create a server over the given state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the Axum router with all routes and layers.
    ///
    /// CORS is wide open, matching the API's public-demo posture.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(websocket::ws_handler))
            .route("/auth/signup", post(routes::auth::signup))
            .route("/auth/login", post(routes::auth::login))
            .route(
                "/auth/status",
                get(routes::auth::get_status).put(routes::auth::update_status),
            )
            .route("/feed/posts", get(routes::feed::list_posts))
            .route("/feed/post", post(routes::feed::create_post))
            .route(
                "/feed/post/{id}",
                get(routes::feed::get_post)
                    .put(routes::feed::update_post)
                    .delete(routes::feed::delete_post),
            )
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state.clone())
    }

    /// Bind and serve until `shutdown` fires.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(
        &self,
        shutdown: CancellationToken,
    ) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let bind_addr = format!(
            "{}:{}",
            self.state.settings.server.host, self.state.settings.server.port
        );
        let listener = TcpListener::bind(&bind_addr).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "listening");

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        let join = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned());
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "server exited with error");
            }
        });
        Ok((addr, join))
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.hub.connection_count(),
        state.hub.dropped_deliveries(),
    ))
}
