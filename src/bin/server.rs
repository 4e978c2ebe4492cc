//! Routlin Sync Server
//!
//! Stores each user's tracker record so it can be restored on another
//! device.
//!
//! # Configuration
//!
//! Environment variables:
//! - `ROUTLIN_PORT`: Port to listen on (default: 8080)
//! - `ROUTLIN_DATABASE_PATH`: SQLite database file (default: ~/.local/share/routlin-server/routlin.db)
//! - `RUST_LOG`: Log filter (default: `routlin_server=info,tower_http=info`)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `POST /api/signup`, `POST /api/login`: Account access, returns a session token
//! - `POST /api/sync`: Replace the stored record with the client's copy
//! - `POST /api/change-password`, `POST /api/delete-account`

#[path = "../server/mod.rs"]
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::{now_ms, router, AppState, ServerStorage};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// SQLite database file
    database_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("ROUTLIN_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let database_path = std::env::var("ROUTLIN_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("routlin-server")
                    .join("routlin.db")
            });

        Self {
            port,
            database_path,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routlin_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Database: {}", config.database_path.display());

    let storage = match ServerStorage::open(&config.database_path).await {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    match storage.cleanup_sessions(now_ms()).await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Removed {} expired session(s)", n),
        Err(e) => tracing::warn!("Failed to clean up sessions: {}", e),
    }

    let app = router(AppState { storage });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
