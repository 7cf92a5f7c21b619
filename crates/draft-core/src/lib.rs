//! Session state machine and configuration for the draft room.
//!
//! - [`session`] -- the turn-gated pick/reset state store
//! - [`config`] -- typed configuration loaded from `draft-config.yaml`
//!
//! Nothing in this crate performs network I/O or locking. The server
//! crate owns the single mutation path and the connection fan-out.

pub mod config;
pub mod session;

pub use config::{ConfigError, DraftConfig};
pub use session::{DraftSession, PickRejection};
