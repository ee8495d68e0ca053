//! Library root so integration tests under `tests/` (the E4/E5 scenarios
//! that span the store, the season controller, and the broadcast stream)
//! can exercise the same code the `gridblitz` binary runs, rather than
//! duplicating it behind `#[cfg(test)]`.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod error;
pub mod play;
pub mod rng;
pub mod schedule;
pub mod season;
pub mod store;
pub mod team;
pub mod verifier;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use config::AppConfig;
use season::tick::TickLock;
use store::Store;

/// Shared application state. `store` replaces the teacher's `EspnClient`:
/// GridBlitz has no upstream feed to poll, only its own durable state and
/// the `tick` lock guarding concurrent advances of it.
pub struct AppState {
    pub store: Store,
    pub config: AppConfig,
    pub tick_lock: Arc<TickLock>,
}

/// Builds the full `axum` router over `state` — shared by `main.rs` and
/// by integration tests that need a real HTTP surface rather than calling
/// module functions directly.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/simulate", post(api::simulate::simulate))
        .route("/api/game/current", get(api::game::get_current_game))
        .route("/api/game/{game_id}", get(api::game::get_game))
        .route("/api/game/{game_id}/stream", get(broadcast::stream_game))
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "GridBlitz API"
}

async fn health() -> &'static str {
    "OK"
}
