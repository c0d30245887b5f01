//! Bracket data models: teams, tournaments, enrollments and matches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::{BracketError, BracketResult};
use crate::store::{Entity, EntityId};

/// Team ID type
pub type TeamId = EntityId;

/// Tournament ID type
pub type TournamentId = EntityId;

/// Match ID type
pub type MatchId = EntityId;

/// Enrollment ID type
pub type EnrollmentId = EntityId;

/// Team counts a bracket can be seeded with
pub const VALID_TEAM_COUNTS: [usize; 4] = [2, 4, 8, 16];

/// Largest bracket supported
pub const MAX_TEAMS: usize = 16;

/// Whether `count` teams form a full single-elimination bracket
pub fn is_valid_team_count(count: usize) -> bool {
    VALID_TEAM_COUNTS.contains(&count)
}

/// Team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: TeamId,
    /// Display name
    pub name: String,
    /// Optional power rating
    pub power: Option<f64>,
}

impl Team {
    pub fn new(name: impl Into<String>, power: Option<f64>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            power,
        }
    }
}

impl Entity for Team {
    const COLLECTION: &'static str = "teams";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Tournament status. Only ever moves from `Active` to `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Bracket in progress
    #[default]
    Active,
    /// A champion has been decided
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default)]
    pub id: TournamentId,
    pub name: String,
    /// Day the tournament is played
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(default)]
    pub status: TournamentStatus,
}

impl Tournament {
    /// Create an active tournament
    pub fn new(name: impl Into<String>, date: Option<NaiveDate>, location: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            date,
            location,
            status: TournamentStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TournamentStatus::Active
    }

    /// Mark the tournament completed, returning whether the status changed
    pub fn complete(&mut self) -> bool {
        if self.is_active() {
            self.status = TournamentStatus::Completed;
            true
        } else {
            false
        }
    }
}

impl Entity for Tournament {
    const COLLECTION: &'static str = "tournaments";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Team enrolled in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub id: EnrollmentId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
}

impl Enrollment {
    pub fn new(tournament_id: TournamentId, team_id: TeamId) -> Self {
        Self {
            id: 0,
            tournament_id,
            team_id,
        }
    }
}

impl Entity for Enrollment {
    const COLLECTION: &'static str = "enrollments";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Slot of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

/// A single match of the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round number (1-indexed)
    pub round: u32,
    pub team_a_id: Option<TeamId>,
    pub team_b_id: Option<TeamId>,
    pub team_a_score: Option<u32>,
    pub team_b_score: Option<u32>,
    pub winner_id: Option<TeamId>,
    /// Match the winner moves on to
    pub next_match_id: Option<MatchId>,
}

impl Match {
    /// Create an unplayed match
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        team_a_id: Option<TeamId>,
        team_b_id: Option<TeamId>,
    ) -> Self {
        Self {
            id: 0,
            tournament_id,
            round,
            team_a_id,
            team_b_id,
            team_a_score: None,
            team_b_score: None,
            winner_id: None,
            next_match_id: None,
        }
    }

    /// Whether a winner has been recorded
    pub fn is_decided(&self) -> bool {
        self.winner_id.is_some()
    }

    /// Whether both slots hold a team
    pub fn is_ready(&self) -> bool {
        self.team_a_id.is_some() && self.team_b_id.is_some()
    }

    /// Whether `team_id` occupies either slot
    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.team_a_id == Some(team_id) || self.team_b_id == Some(team_id)
    }

    /// Record the final score and derive the winner.
    ///
    /// Returns `Ok(false)` when the same result was already recorded, so a
    /// retried submission leaves the match untouched. Nothing is modified on
    /// any error path.
    ///
    /// # Errors
    ///
    /// - `Validation` for tied scores or a match missing a team
    /// - `Conflict` when a different result was already recorded
    pub fn record_result(&mut self, team_a_score: u32, team_b_score: u32) -> BracketResult<bool> {
        if team_a_score == team_b_score {
            return Err(BracketError::Validation(format!(
                "Tied score {team_a_score}-{team_b_score} in match {}: ties are not allowed",
                self.id
            )));
        }

        let (Some(team_a), Some(team_b)) = (self.team_a_id, self.team_b_id) else {
            return Err(BracketError::Validation(format!(
                "Match {} does not have both teams yet",
                self.id
            )));
        };

        if self.is_decided() {
            if self.team_a_score == Some(team_a_score) && self.team_b_score == Some(team_b_score) {
                return Ok(false);
            }
            return Err(BracketError::Conflict(format!(
                "Match {} already has a different result",
                self.id
            )));
        }

        self.team_a_score = Some(team_a_score);
        self.team_b_score = Some(team_b_score);
        self.winner_id = Some(if team_a_score > team_b_score {
            team_a
        } else {
            team_b
        });

        Ok(true)
    }

    /// Place a team into the first empty slot.
    ///
    /// Returns the slot used, or `None` when the team is already present or
    /// both slots are taken.
    pub fn place_team(&mut self, team_id: TeamId) -> Option<Slot> {
        if self.has_team(team_id) {
            return None;
        }

        if self.team_a_id.is_none() {
            self.team_a_id = Some(team_id);
            Some(Slot::A)
        } else if self.team_b_id.is_none() {
            self.team_b_id = Some(team_id);
            Some(Slot::B)
        } else {
            None
        }
    }
}

impl Entity for Match {
    const COLLECTION: &'static str = "matches";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
