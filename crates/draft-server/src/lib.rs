//! Real-time draft session server.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where clients submit picks and
//!   resets and receive the full session state after every accepted
//!   change
//! - **Read-only REST endpoints** for the current state, one team's
//!   roster, and the connected clients
//! - **Landing page** (`GET /`) with a small browser client
//!
//! # Architecture
//!
//! [`SessionController`] owns the draft session behind a single async
//! mutex and is the only code that mutates it. After each accepted
//! mutation it broadcasts the new snapshot through the
//! [`ConnectionRegistry`], which hands the frame to each client's
//! bounded outbound queue without blocking. A client whose queue is full
//! or whose socket write times out is dropped from the registry.
//!
//! [`SessionController`]: controller::SessionController
//! [`ConnectionRegistry`]: registry::ConnectionRegistry

pub mod controller;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use controller::{DispatchOutcome, SessionController};
pub use registry::{ClientChannel, ConnectionRegistry, DeliveryError, Sendable};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{RunningServer, StartupError, spawn_server};
pub use state::AppState;
