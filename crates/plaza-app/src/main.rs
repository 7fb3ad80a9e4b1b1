//! # plaza-app
//!
//! Plaza server binary — loads settings, opens the database, starts the
//! broadcast hub and the HTTP/WebSocket server, and handles shutdown.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use plaza_hub::{FeedHub, HubConfig};
use plaza_server::shutdown::ShutdownCoordinator;
use plaza_server::{AppState, PlazaServer};
use plaza_store::{ConnectionConfig, PostRepository, UserRepository};
use tracing_subscriber::EnvFilter;

/// Plaza server.
#[derive(Parser, Debug)]
#[command(name = "plaza", about = "Plaza social feed server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 auto-assigns).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database file.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Cli {
    fn default_db_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home)
            .join(".plaza")
            .join("database")
            .join("plaza.db")
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Settings before logging: the default log filter lives there.
    let mut settings = plaza_settings::load_settings().context("Failed to load settings")?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .init();

    if settings.auth.token_secret == plaza_settings::AuthSettings::default().token_secret {
        tracing::warn!(
            "using the built-in development token secret; set PLAZA_TOKEN_SECRET in production"
        );
    }

    // Database
    let db_path = args.db_path.unwrap_or_else(Cli::default_db_path);
    ensure_parent_dir(&db_path)?;
    let pool = plaza_store::new_file(
        db_path.to_string_lossy().as_ref(),
        &ConnectionConfig::default(),
    )
    .context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let _ = plaza_store::migrations::run_migrations(&conn)
            .context("Failed to run migrations")?;
    }
    tracing::info!(path = %db_path.display(), "database ready");

    // Broadcast hub
    let hub_config = HubConfig {
        control_queue_capacity: settings.hub.control_queue_capacity,
        delivery_timeout: Duration::from_secs(settings.hub.delivery_timeout_secs),
        max_in_flight_per_connection: settings.hub.max_in_flight_per_connection,
    };
    let (hub, hub_join) = FeedHub::spawn(hub_config);

    // Server
    let state = AppState {
        hub: hub.clone(),
        users: UserRepository::new(pool.clone()),
        posts: PostRepository::new(pool),
        settings: Arc::new(settings),
        start_time: Instant::now(),
    };
    let shutdown = ShutdownCoordinator::new();
    let server = PlazaServer::new(state);
    let (addr, server_join) = server
        .listen(shutdown.token())
        .await
        .context("Failed to start server")?;
    tracing::info!(%addr, "plaza is up");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    tracing::info!("shutting down");

    hub.shutdown();
    shutdown.drain(vec![server_join, hub_join], None).await;
    Ok(())
}
