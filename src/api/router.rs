use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::SharedState;

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (outside /api prefix)
        .route("/health", get(handlers::health))
        // Replay
        .route("/api/fen", post(handlers::fen))
        .route("/api/positions", post(handlers::positions))
        // Move-text queries
        .route("/api/first-moves", post(handlers::first_moves))
        .route("/api/has-opening", post(handlers::has_opening))
        .route("/api/has-board", post(handlers::has_board))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
