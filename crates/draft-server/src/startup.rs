//! Background startup helper.
//!
//! [`spawn_server`] binds eagerly, so address errors surface to the
//! caller, then runs the server on a background Tokio task. The returned
//! [`RunningServer`] reports the bound address (useful with port `0`) and
//! triggers a graceful shutdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! let state = Arc::new(AppState::from_config(&config));
//! let server = spawn_server(&config.server, state).await?;
//! tokio::signal::ctrl_c().await?;
//! server.shutdown().await;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use draft_core::config::ServerConfig;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the draft server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Handle to a server running on a background task.
pub struct RunningServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// The address the server is listening on.
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for the server task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "draft server task failed");
        }
    }
}

/// Bind `config` and serve on a background task.
pub async fn spawn_server(config: &ServerConfig, state: Arc<AppState>) -> Result<RunningServer, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("listener has no address: {e}")))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "draft server exited with error");
        }
    });

    tracing::info!(%addr, "draft server spawned on background task");

    Ok(RunningServer {
        addr,
        shutdown_tx,
        handle,
    })
}
