//! Server-side modules for the Routlin sync server.

pub mod auth;
pub mod routes;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use storage::ServerStorage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: ServerStorage,
}

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/signup", post(routes::signup))
        .route("/api/login", post(routes::login))
        .route("/api/sync", post(routes::sync))
        .route("/api/change-password", post(routes::change_password))
        .route("/api/delete-account", post(routes::delete_account))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
