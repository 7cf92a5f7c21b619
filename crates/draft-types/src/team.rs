//! Team identifiers.
//!
//! A session always has exactly two teams. They are modelled as a closed
//! enum so that "turn is one of the two teams" holds by construction.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the two teams taking part in the draft.
///
/// Serialized as the bare letter (`"A"` / `"B"`), which is also the key
/// used in the snapshot's `teams` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TeamId {
    /// The team that picks first after a reset.
    A,
    /// The team that picks second.
    B,
}

impl TeamId {
    /// Both teams, in pick order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// The team that opens every session.
    pub const FIRST: Self = Self::A;

    /// The other team.
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Wire representation of this team.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team name that is neither `A` nor `B`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown team: {0:?}")]
pub struct UnknownTeam(pub String);

impl FromStr for TeamId {
    type Err = UnknownTeam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(UnknownTeam(other.to_owned())),
        }
    }
}
