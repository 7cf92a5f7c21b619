//! Shared application state for the draft server.
//!
//! [`AppState`] bundles the [`SessionController`] with the per-client
//! delivery limits the WebSocket handler needs. It is wrapped in
//! [`Arc`] and injected via Axum's `State` extractor.

use std::sync::Arc;

use draft_core::DraftSession;
use draft_core::config::{ConnectionConfig, DraftConfig};

use crate::controller::SessionController;

/// Shared state for the Axum application.
pub struct AppState {
    /// The single mutation path for the draft session.
    pub controller: Arc<SessionController>,
    /// Outbound queue depth and write deadline for each client.
    pub connection: ConnectionConfig,
}

impl AppState {
    /// Build state from a loaded configuration.
    pub fn from_config(config: &DraftConfig) -> Self {
        Self::new(
            DraftSession::new(config.session.max_rounds),
            config.connection.clone(),
        )
    }

    /// Build state around an existing session.
    pub fn new(session: DraftSession, connection: ConnectionConfig) -> Self {
        Self {
            controller: Arc::new(SessionController::new(session)),
            connection,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DraftSession::default(), ConnectionConfig::default())
    }
}
