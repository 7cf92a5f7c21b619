//! HTTP endpoint handlers for the draft server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Landing page with the browser client |
//! | `GET` | `/api/state` | Current session snapshot |
//! | `GET` | `/api/teams/{team}` | One team's picks |
//! | `GET` | `/api/connections` | Registered `WebSocket` clients |
//!
//! All reads go through the controller, so they observe committed state
//! only.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Html;
use draft_types::{SessionSnapshot, TeamId};
use serde::Serialize;

use crate::error::ApiError;
use crate::registry::ConnectionInfo;
use crate::state::AppState;

/// The landing page, embedded at compile time.
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Response body for `GET /api/teams/{team}`.
#[derive(Debug, Serialize)]
pub struct TeamRoster {
    /// The team.
    pub team: TeamId,
    /// Its picks, in order.
    pub players: Vec<String>,
    /// Whether this team picks next.
    pub on_turn: bool,
}

/// Response body for `GET /api/connections`.
#[derive(Debug, Serialize)]
pub struct ConnectionList {
    /// Number of registered clients.
    pub count: usize,
    /// One entry per client.
    pub connections: Vec<ConnectionInfo>,
}

/// Serve the landing page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Return the current session snapshot.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.controller.status().await)
}

/// Return one team's roster.
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> Result<Json<TeamRoster>, ApiError> {
    let team: TeamId = team
        .parse()
        .map_err(|e: draft_types::UnknownTeam| ApiError::NotFound(e.to_string()))?;
    let mut snapshot = state.controller.status().await;
    let players = snapshot.teams.remove(&team).unwrap_or_default();
    Ok(Json(TeamRoster {
        team,
        players,
        on_turn: snapshot.turn == team && !snapshot.finished,
    }))
}

/// List registered `WebSocket` clients.
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<ConnectionList> {
    let connections = state.controller.registry().connections().await;
    Json(ConnectionList {
        count: connections.len(),
        connections,
    })
}
