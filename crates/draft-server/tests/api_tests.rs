//! Integration tests for the draft server's HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use draft_core::DraftSession;
use draft_core::config::ConnectionConfig;
use draft_server::router::build_router;
use draft_server::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

async fn make_test_state() -> Arc<AppState> {
    let state = Arc::new(AppState::new(DraftSession::new(4), ConnectionConfig::default()));
    let _ = state.controller.pick("A", String::from("Ada")).await;
    let _ = state.controller.pick("B", String::from("Babbage")).await;
    let _ = state.controller.pick("A", String::from("Curie")).await;
    state
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, axum::body::Bytes) {
    let response = build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(state, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_index_returns_html() {
    let (status, bytes) = get(make_test_state().await, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<title>Draft Room</title>"));
    assert!(html.contains("/ws"));
}

#[tokio::test]
async fn test_get_state() {
    let (status, json) = get_json(make_test_state().await, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "teams": { "A": ["Ada", "Curie"], "B": ["Babbage"] },
            "turn": "B",
            "round": 4,
            "finished": false,
        })
    );
}

#[tokio::test]
async fn test_get_state_after_finish() {
    let state = make_test_state().await;
    let _ = state.controller.pick("B", String::from("Dijkstra")).await;
    let (_, json) = get_json(state, "/api/state").await;
    assert_eq!(json["round"], 5);
    assert_eq!(json["finished"], true);
}

#[tokio::test]
async fn test_get_team() {
    let state = make_test_state().await;
    let (status, json) = get_json(Arc::clone(&state), "/api/teams/A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["team"], "A");
    assert_eq!(json["players"], serde_json::json!(["Ada", "Curie"]));
    assert_eq!(json["on_turn"], false);

    let (_, json) = get_json(state, "/api/teams/B").await;
    assert_eq!(json["players"], serde_json::json!(["Babbage"]));
    assert_eq!(json["on_turn"], true);
}

#[tokio::test]
async fn test_get_unknown_team_returns_404() {
    let (status, json) = get_json(make_test_state().await, "/api/teams/C").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert!(json["error"].as_str().unwrap().contains("unknown team"));
}

#[tokio::test]
async fn test_list_connections_empty() {
    let (status, json) = get_json(make_test_state().await, "/api/connections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
    assert_eq!(json["connections"], serde_json::json!([]));
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let (status, _) = get(make_test_state().await, "/api/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
