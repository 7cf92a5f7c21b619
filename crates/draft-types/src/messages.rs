//! Message envelopes exchanged over the session WebSocket.
//!
//! Both directions use JSON objects tagged with a `type` field:
//!
//! | Direction | `type` | Payload |
//! |-----------|--------|---------|
//! | client -> server | `pick` | `team`, `player` |
//! | client -> server | `reset` | none |
//! | server -> client | `state` | `teams`, `turn`, `round`, `finished` |
//!
//! Any other inbound `type` decodes to [`ClientMessage::Unknown`] so the
//! controller can drop it without treating it as malformed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::team::TeamId;

/// Immutable copy of the session state, sent to every client after each
/// accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionSnapshot {
    /// Picks per team, in pick order. Both teams are always present.
    pub teams: BTreeMap<TeamId, Vec<String>>,
    /// The team allowed to pick next.
    pub turn: TeamId,
    /// Pick counter, starting at 1.
    pub round: u32,
    /// Whether the pick budget is exhausted.
    pub finished: bool,
}

impl SessionSnapshot {
    /// Picks made by one team so far.
    pub fn picks(&self, team: TeamId) -> &[String] {
        self.teams.get(&team).map_or(&[], Vec::as_slice)
    }

    /// Total picks across both teams.
    pub fn total_picks(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }
}

/// A message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Add `player` to `team`'s roster if it is that team's turn.
    Pick {
        /// Raw team name as sent by the client; validated by the session.
        team: String,
        /// Player identifier. Not validated.
        player: String,
    },
    /// Restore the session to its initial state.
    Reset,
    /// Any unrecognised `type`. Ignored by the server.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Decode a text frame.
    ///
    /// Fails on invalid JSON, a missing `type`, or a known `type` with
    /// missing or mistyped fields.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pick { .. } => "pick",
            Self::Reset => "reset",
            Self::Unknown => "unknown",
        }
    }
}

/// A message sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full session state.
    State(SessionSnapshot),
}

impl ServerMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<SessionSnapshot> for ServerMessage {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self::State(snapshot)
    }
}
