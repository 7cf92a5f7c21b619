//! The draft session state store.
//!
//! [`DraftSession`] holds the two rosters, whose turn it is, the round
//! counter and the finished flag. It enforces the turn rules and nothing
//! else: callers are responsible for serializing access.
//!
//! # Invariants
//!
//! - `turn` is one of the two [`TeamId`]s (by construction).
//! - `round` is in `1..=max_rounds + 1`, and `max_rounds + 1` implies
//!   `finished`.
//! - The number of picks across both teams equals `round - 1`.
//! - Once `finished`, only [`DraftSession::reset`] changes state.

use std::collections::BTreeMap;

use draft_types::{SessionSnapshot, TeamId, UnknownTeam};

/// Why a pick was refused. A refused pick never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickRejection {
    /// All rounds have been played.
    #[error("session finished at round {round}")]
    Finished {
        /// The round counter at the time of the attempt.
        round: u32,
    },

    /// The team is not the one whose turn it is.
    #[error("team {attempted} picked out of turn (expected {expected})")]
    OutOfTurn {
        /// The team that tried to pick.
        attempted: TeamId,
        /// The team whose turn it is.
        expected: TeamId,
    },

    /// The team name is not one of the session's teams.
    #[error("unknown team {team:?}")]
    UnknownTeam {
        /// The name the client sent.
        team: String,
    },
}

impl From<UnknownTeam> for PickRejection {
    fn from(err: UnknownTeam) -> Self {
        Self::UnknownTeam { team: err.0 }
    }
}

/// Turn-based pick state for one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession {
    teams: BTreeMap<TeamId, Vec<String>>,
    turn: TeamId,
    round: u32,
    max_rounds: u32,
    finished: bool,
}

impl DraftSession {
    /// Create a fresh session that allows `max_rounds` picks in total.
    ///
    /// A budget of zero is treated as one.
    pub fn new(max_rounds: u32) -> Self {
        Self {
            teams: empty_rosters(),
            turn: TeamId::FIRST,
            round: 1,
            max_rounds: max_rounds.max(1),
            finished: false,
        }
    }

    /// Record `player` for `team` if `team` holds the turn.
    ///
    /// On success the turn passes to the other team and the round
    /// counter advances; the session finishes once the counter passes
    /// the pick budget.
    pub fn try_pick(&mut self, team: TeamId, player: impl Into<String>) -> Result<(), PickRejection> {
        if self.finished {
            return Err(PickRejection::Finished { round: self.round });
        }
        if team != self.turn {
            return Err(PickRejection::OutOfTurn {
                attempted: team,
                expected: self.turn,
            });
        }

        self.teams.entry(team).or_default().push(player.into());
        self.turn = team.opponent();
        self.round = self.round.saturating_add(1);
        if self.round > self.max_rounds {
            self.finished = true;
        }
        Ok(())
    }

    /// Like [`try_pick`](Self::try_pick), but takes the team as sent on
    /// the wire.
    pub fn try_pick_named(&mut self, team: &str, player: impl Into<String>) -> Result<(), PickRejection> {
        let team: TeamId = team.parse()?;
        self.try_pick(team, player)
    }

    /// Boolean form of [`try_pick`](Self::try_pick).
    pub fn pick(&mut self, team: TeamId, player: impl Into<String>) -> bool {
        self.try_pick(team, player).is_ok()
    }

    /// Restore the initial state. The pick budget is kept.
    pub fn reset(&mut self) {
        self.teams = empty_rosters();
        self.turn = TeamId::FIRST;
        self.round = 1;
        self.finished = false;
    }

    /// Owned copy of the current state.
    pub fn status(&self) -> SessionSnapshot {
        SessionSnapshot {
            teams: self.teams.clone(),
            turn: self.turn,
            round: self.round,
            finished: self.finished,
        }
    }

    /// The team allowed to pick next.
    pub const fn turn(&self) -> TeamId {
        self.turn
    }

    /// Current round counter.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Total pick budget.
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Whether the pick budget is exhausted.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Picks made across both teams.
    pub fn picks_made(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_ROUNDS)
    }
}

fn empty_rosters() -> BTreeMap<TeamId, Vec<String>> {
    TeamId::ALL.into_iter().map(|team| (team, Vec::new())).collect()
}
