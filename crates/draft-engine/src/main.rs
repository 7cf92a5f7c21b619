//! Draft room server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `DRAFT_CONFIG` or `draft-config.yaml`,
//!    logging through a bootstrap subscriber
//! 2. Initialize structured logging (tracing) from the loaded config
//! 3. Build the session controller and connection registry
//! 4. Bind and start the HTTP + `WebSocket` server
//! 5. Wait for Ctrl-C, then shut down gracefully

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use draft_core::DraftConfig;
use draft_core::config::LoggingConfig;
use draft_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file used when `DRAFT_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "draft-config.yaml";

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration (logging settings live in it).
    let (config, source) = {
        let _bootstrap = bootstrap_logging();
        load_config()?
    };

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        source = %source,
        host = %config.server.host,
        port = config.server.port,
        max_rounds = config.session.max_rounds,
        send_timeout_ms = config.connection.send_timeout_ms,
        outbound_buffer = config.connection.outbound_buffer,
        "Configuration loaded"
    );

    // 3. Session state and registry.
    let state = Arc::new(AppState::from_config(&config));

    // 4. Server.
    let server = draft_server::spawn_server(&config.server, state).await?;
    info!(addr = %server.local_addr(), "draft-engine ready");

    // 5. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|source| EngineError::Signal { source })?;
    info!("shutdown signal received");
    server.shutdown().await;

    info!("draft-engine shutdown complete");
    Ok(())
}

/// Load configuration, falling back to defaults when no file exists.
///
/// Returns the config and a description of where it came from.
fn load_config() -> Result<(DraftConfig, String), EngineError> {
    let path = std::env::var_os("DRAFT_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = DraftConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        // Still apply env overrides and validation.
        let config = DraftConfig::parse("")?;
        Ok((config, String::from("defaults")))
    }
}

/// Scoped subscriber that captures warnings raised while the config is
/// loading, before the configured subscriber can be built.
fn bootstrap_logging() -> tracing::subscriber::DefaultGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
