//! Shared type definitions for the draft room.
//!
//! This crate is the single source of truth for everything that crosses
//! the WebSocket boundary. Snapshot and team types flow downstream to
//! `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for connection handles
//! - [`team`] -- The two fixed team identifiers
//! - [`messages`] -- Inbound and outbound message envelopes

pub mod ids;
pub mod messages;
pub mod team;

pub use ids::ConnectionId;
pub use messages::{ClientMessage, ServerMessage, SessionSnapshot};
pub use team::{TeamId, UnknownTeam};
