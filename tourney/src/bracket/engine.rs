//! Bracket progression engine.
//!
//! Each operation is a short sequence of reads and writes against the entity
//! store. None of them lock: callers that can race on the same tournament
//! (see [`crate::tournament::TournamentManager`]) wrap them in a
//! [`super::TournamentLocks`] guard.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{BracketError, BracketResult};
use super::models::{Match, MatchId, TeamId, Tournament, TournamentId};
use super::rounds::{RoundPlan, champion, plan_next_round};
use super::seeder::BracketSeeder;
use crate::store::{EntityStore, Repository};

/// Seeds brackets and propagates results round by round
#[derive(Clone)]
pub struct BracketEngine {
    matches: Repository<Match>,
    tournaments: Repository<Tournament>,
    seeder: Arc<Mutex<BracketSeeder>>,
}

impl BracketEngine {
    /// Create an engine over `store`, pairing first rounds with `seeder`
    pub fn new(store: Arc<dyn EntityStore>, seeder: BracketSeeder) -> Self {
        Self {
            matches: Repository::new(Arc::clone(&store)),
            tournaments: Repository::new(store),
            seeder: Arc::new(Mutex::new(seeder)),
        }
    }

    /// Load a match
    pub async fn find_match(&self, match_id: MatchId) -> BracketResult<Match> {
        self.matches
            .find(match_id)
            .await?
            .ok_or(BracketError::not_found("Match", match_id))
    }

    /// Every match of a tournament, in creation order
    pub async fn matches_for(&self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        Ok(self
            .matches
            .scan_where("tournament_id", tournament_id)
            .await?)
    }

    /// Matches of one round, in creation order
    pub async fn round_matches(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> BracketResult<Vec<Match>> {
        let mut matches = self.matches_for(tournament_id).await?;
        matches.retain(|m| m.round == round);
        Ok(matches)
    }

    /// Create the first round from the enrolled teams.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the tournament does not exist
    /// - `Conflict` if the tournament already has matches
    pub async fn seed_first_round(
        &self,
        tournament_id: TournamentId,
        team_ids: &[TeamId],
    ) -> BracketResult<Vec<Match>> {
        if self.tournaments.find(tournament_id).await?.is_none() {
            return Err(BracketError::not_found("Tournament", tournament_id));
        }

        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        if !self.matches_for(tournament_id).await?.is_empty() {
            return Err(BracketError::Conflict(format!(
                "Tournament {tournament_id} has already been seeded"
            )));
        }

        let pairs = self.seeder.lock().await.pair_teams(team_ids);

        let mut created = Vec::with_capacity(pairs.len());
        for (team_a, team_b) in pairs {
            let m = self
                .matches
                .create(Match::new(tournament_id, 1, Some(team_a), Some(team_b)))
                .await?;
            created.push(m);
        }

        log::info!(
            "Tournament {}: seeded {} first-round matches for {} teams",
            tournament_id,
            created.len(),
            team_ids.len()
        );

        Ok(created)
    }

    /// Store a match's final score and derive its winner.
    ///
    /// Re-submitting the result a match already has is a no-op.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the match does not exist
    /// - `Validation` for tied scores or a match still missing a team
    /// - `Conflict` if a different result was already recorded
    pub async fn record_result(
        &self,
        match_id: MatchId,
        team_a_score: u32,
        team_b_score: u32,
    ) -> BracketResult<Match> {
        let mut m = self.find_match(match_id).await?;

        if m.record_result(team_a_score, team_b_score)? {
            self.matches.save(&m).await?;
            log::debug!(
                "Match {} (round {}): {}-{}, winner {:?}",
                m.id,
                m.round,
                team_a_score,
                team_b_score,
                m.winner_id
            );
        }

        Ok(m)
    }

    /// Move a decided match's winner into its downstream match.
    ///
    /// The winner takes the first empty slot. Returns the downstream match id,
    /// or `None` when the match is undecided or has no downstream match yet.
    pub async fn advance_winner(&self, match_id: MatchId) -> BracketResult<Option<MatchId>> {
        let m = self.find_match(match_id).await?;

        let (Some(winner), Some(next_id)) = (m.winner_id, m.next_match_id) else {
            return Ok(None);
        };

        let mut next = self.find_match(next_id).await?;
        if let Some(slot) = next.place_team(winner) {
            self.matches.save(&next).await?;
            log::debug!(
                "Match {}: team {} advanced to match {} slot {:?}",
                m.id,
                winner,
                next.id,
                slot
            );
        }

        Ok(Some(next_id))
    }

    /// Build the round after `round` once every match of it is decided.
    ///
    /// Returns the created matches; every skip path (undecided, already
    /// generated, final) returns an empty list.
    pub async fn generate_next_round(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> BracketResult<Vec<Match>> {
        let all = self.matches_for(tournament_id).await?;
        let next_round = round + 1;

        let mut current: Vec<Match> = all.iter().filter(|m| m.round == round).cloned().collect();
        let next_round_exists = all.iter().any(|m| m.round == next_round);

        let planned = match plan_next_round(&current, next_round_exists) {
            RoundPlan::Skip(reason) => {
                log::debug!(
                    "Tournament {}: round {} not generated ({:?})",
                    tournament_id,
                    next_round,
                    reason
                );
                return Ok(Vec::new());
            }
            RoundPlan::Create(planned) => planned,
        };

        let mut created = Vec::with_capacity(planned.len());
        for plan in &planned {
            let m = self
                .matches
                .create(Match::new(
                    tournament_id,
                    next_round,
                    Some(plan.team_a_id),
                    Some(plan.team_b_id),
                ))
                .await?;
            created.push(m);
        }

        for (plan, next) in planned.iter().zip(&created) {
            for &source in &plan.sources {
                let m = &mut current[source];
                m.next_match_id = Some(next.id);
                self.matches.save(m).await?;
            }
        }

        log::info!(
            "Tournament {}: generated round {} with {} matches",
            tournament_id,
            next_round,
            created.len()
        );

        Ok(created)
    }

    /// The champion, once the sole match of the last round is decided
    pub async fn tournament_winner(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<TeamId>> {
        Ok(champion(&self.matches_for(tournament_id).await?))
    }

    /// Flip an active tournament to completed once it has a champion.
    ///
    /// Returns whether the status changed; a completed tournament stays
    /// completed and yields `false`.
    pub async fn complete_tournament_if_finished(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<bool> {
        let mut tournament = self
            .tournaments
            .find(tournament_id)
            .await?
            .ok_or(BracketError::not_found("Tournament", tournament_id))?;

        let Some(winner) = self.tournament_winner(tournament_id).await? else {
            return Ok(false);
        };

        if !tournament.complete() {
            return Ok(false);
        }

        self.tournaments.save(&tournament).await?;
        log::info!(
            "Tournament {} '{}' completed, champion team {}",
            tournament.id,
            tournament.name,
            winner
        );

        Ok(true)
    }
}
