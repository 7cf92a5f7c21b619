//! `WebSocket` handler for the draft session.
//!
//! Clients connect to `GET /ws`, immediately receive the current state,
//! and then receive a `state` frame after every accepted pick or reset
//! from any client. Inbound text frames are handed to the
//! [`SessionController`](crate::controller::SessionController).
//!
//! Each connection runs two halves:
//!
//! - a writer task draining the client's bounded outbound queue, with a
//!   deadline on every socket write
//! - the reader loop in this task
//!
//! Whichever half ends first tears the connection down, and the handle
//! is unregistered exactly once.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controller::DispatchOutcome;
use crate::registry::ClientChannel;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` session connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_session(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Run one client connection to completion.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<str>>(state.connection.outbound_buffer);
    let controller = Arc::clone(&state.controller);
    let conn_id = controller.connect(Arc::new(ClientChannel::new(tx))).await;

    let send_timeout = state.connection.send_timeout();
    let timeout_ms = state.connection.send_timeout_ms;
    let mut writer = tokio::spawn(async move {
        // Ends when the registry drops this client's sender or a write fails.
        while let Some(frame) = rx.recv().await {
            let msg = Message::Text(String::from(&*frame).into());
            match tokio::time::timeout(send_timeout, sink.send(msg)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                    return;
                }
                Err(_) => {
                    warn!(
                        conn_id = %conn_id,
                        timeout_ms,
                        "WebSocket send timed out, dropping client"
                    );
                    return;
                }
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match controller.handle_text(text.as_str()).await {
                            DispatchOutcome::Applied(snapshot) => {
                                debug!(conn_id = %conn_id, round = snapshot.round, "message applied");
                            }
                            DispatchOutcome::Rejected(reason) => {
                                debug!(conn_id = %conn_id, %reason, "message rejected");
                            }
                            DispatchOutcome::Ignored | DispatchOutcome::Malformed(_) => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(conn_id = %conn_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary, ping and pong frames carry no session input.
                    }
                }
            }
            _ = &mut writer => {
                debug!(conn_id = %conn_id, "WebSocket writer finished");
                break;
            }
        }
    }

    controller.disconnect(conn_id).await;
    writer.abort();
}
