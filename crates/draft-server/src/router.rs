//! Axum router construction for the draft server.
//!
//! Assembles all routes (landing page, `WebSocket`, REST) into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// - `GET /` -- landing page
/// - `GET /ws` -- `WebSocket` session endpoint
/// - `GET /api/state` -- current snapshot
/// - `GET /api/teams/{team}` -- one team's picks
/// - `GET /api/connections` -- registered clients
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_session))
        .route("/api/state", get(handlers::get_state))
        .route("/api/teams/{team}", get(handlers::get_team))
        .route("/api/connections", get(handlers::list_connections))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
