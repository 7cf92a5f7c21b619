//! Session controller: the single mutation path for the draft.
//!
//! Every pick and reset goes through [`SessionController`], which holds
//! the [`DraftSession`] behind one async mutex. The resulting snapshot
//! is broadcast while that lock is still held, so all clients observe
//! snapshots in commit order and never see a half-applied pick.

use std::sync::Arc;

use draft_core::{DraftSession, PickRejection};
use draft_types::{ClientMessage, ConnectionId, ServerMessage, SessionSnapshot};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::registry::{ConnectionRegistry, Sendable};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The session changed and the new snapshot was broadcast.
    Applied(SessionSnapshot),
    /// A pick was refused. Nothing changed and nothing was sent.
    Rejected(PickRejection),
    /// The message type is not one the session handles.
    Ignored,
    /// The text could not be decoded.
    Malformed(String),
}

impl DispatchOutcome {
    /// Whether the session was mutated.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Owns the draft session and drives the registry.
pub struct SessionController {
    session: Mutex<DraftSession>,
    registry: Arc<ConnectionRegistry>,
}

impl SessionController {
    /// Create a controller over a fresh session and registry.
    pub fn new(session: DraftSession) -> Self {
        Self::with_registry(session, Arc::new(ConnectionRegistry::new()))
    }

    /// Create a controller that fans out through an existing registry.
    pub fn with_registry(session: DraftSession, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            session: Mutex::new(session),
            registry,
        }
    }

    /// The registry this controller broadcasts through.
    pub const fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Register a client and send it the current snapshot.
    ///
    /// The session lock is held across both steps, so the client's first
    /// frame is always the state it joined at and no broadcast can slip
    /// in ahead of it.
    pub async fn connect(&self, sink: Arc<dyn Sendable>) -> ConnectionId {
        let session = self.session.lock().await;
        let id = self.registry.register(sink).await;
        if let Some(frame) = encode(&session.status()) {
            if !self.registry.send_to(id, frame).await {
                debug!(conn_id = %id, "client gone before initial snapshot");
            }
        }
        info!(
            conn_id = %id,
            active = self.registry.connection_count(),
            "client connected"
        );
        id
    }

    /// Forget a client. Safe to call more than once.
    pub async fn disconnect(&self, id: ConnectionId) {
        if self.registry.unregister(id).await {
            info!(
                conn_id = %id,
                active = self.registry.connection_count(),
                "client disconnected"
            );
        }
    }

    /// Decode one text frame and dispatch it.
    pub async fn handle_text(&self, text: &str) -> DispatchOutcome {
        match ClientMessage::parse(text) {
            Ok(msg) => self.dispatch(msg).await,
            Err(e) => {
                warn!(error = %e, "dropping malformed message");
                DispatchOutcome::Malformed(e.to_string())
            }
        }
    }

    /// Apply one decoded message.
    pub async fn dispatch(&self, msg: ClientMessage) -> DispatchOutcome {
        debug!(kind = msg.kind(), "dispatching message");
        match msg {
            ClientMessage::Pick { team, player } => self.pick(&team, player).await,
            ClientMessage::Reset => DispatchOutcome::Applied(self.reset().await),
            ClientMessage::Unknown => {
                debug!("ignoring message with unknown type");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Record a pick and broadcast the result if it was accepted.
    pub async fn pick(&self, team: &str, player: String) -> DispatchOutcome {
        let mut session = self.session.lock().await;
        match session.try_pick_named(team, player) {
            Ok(()) => {
                let snapshot = session.status();
                debug!(
                    team,
                    round = snapshot.round,
                    finished = snapshot.finished,
                    "pick accepted"
                );
                if snapshot.finished {
                    info!(round = snapshot.round, "draft finished");
                }
                self.publish(&snapshot).await;
                DispatchOutcome::Applied(snapshot)
            }
            Err(rejection) => {
                debug!(team, reason = %rejection, "pick rejected");
                DispatchOutcome::Rejected(rejection)
            }
        }
    }

    /// Reset the session and broadcast the fresh state.
    pub async fn reset(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.reset();
        let snapshot = session.status();
        info!("session reset");
        self.publish(&snapshot).await;
        snapshot
    }

    /// Current committed state.
    pub async fn status(&self) -> SessionSnapshot {
        self.session.lock().await.status()
    }

    /// Broadcast a snapshot. Caller must hold the session lock.
    async fn publish(&self, snapshot: &SessionSnapshot) {
        if let Some(frame) = encode(snapshot) {
            let _ = self.registry.broadcast(frame).await;
        }
    }
}

fn encode(snapshot: &SessionSnapshot) -> Option<Arc<str>> {
    match ServerMessage::State(snapshot.clone()).to_json() {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            warn!(error = %e, "failed to serialize state snapshot");
            None
        }
    }
}
