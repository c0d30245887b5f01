//! Tournament manager: teams, tournaments, enrollments and result submission.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{
    EnrollmentView, NewTournament, ResultOutcome, TeamPatch, TournamentBracket, TournamentPatch,
    validate_date, validate_name,
};
use crate::bracket::{
    BracketEngine, BracketError, BracketResult, BracketSeeder, Enrollment, MAX_TEAMS, Match,
    MatchId, Team, TeamId, Tournament, TournamentId, TournamentLocks, TournamentStatus,
    is_valid_team_count,
};
use crate::store::{EntityStore, Repository};

/// Tournament manager
///
/// Every operation that changes a bracket runs while holding that
/// tournament's lock, so concurrent submissions for sibling matches cannot
/// both generate the next round.
///
/// Rules that span tournaments (unique tournament names, no enrollment of a
/// deleted team) are checked and written under the catalog lock. It is always
/// taken before any tournament lock.
#[derive(Clone)]
pub struct TournamentManager {
    teams: Repository<Team>,
    tournaments: Repository<Tournament>,
    enrollments: Repository<Enrollment>,
    engine: BracketEngine,
    locks: TournamentLocks,
    catalog: Arc<Mutex<()>>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(store: Arc<dyn EntityStore>, seeder: BracketSeeder) -> Self {
        Self {
            teams: Repository::new(Arc::clone(&store)),
            tournaments: Repository::new(Arc::clone(&store)),
            enrollments: Repository::new(Arc::clone(&store)),
            engine: BracketEngine::new(store, seeder),
            locks: TournamentLocks::new(),
            catalog: Arc::new(Mutex::new(())),
        }
    }

    /// Bracket engine used by this manager
    pub fn engine(&self) -> &BracketEngine {
        &self.engine
    }

    async fn require_team(&self, team_id: TeamId) -> BracketResult<Team> {
        self.teams
            .find(team_id)
            .await?
            .ok_or(BracketError::not_found("Team", team_id))
    }

    async fn require_tournament(&self, tournament_id: TournamentId) -> BracketResult<Tournament> {
        self.tournaments
            .find(tournament_id)
            .await?
            .ok_or(BracketError::not_found("Tournament", tournament_id))
    }

    async fn ensure_unique_name(&self, name: &str, except: Option<TournamentId>) -> BracketResult<()> {
        let clash = self
            .tournaments
            .scan_where("name", name)
            .await?
            .into_iter()
            .any(|t| Some(t.id) != except);

        if clash {
            return Err(BracketError::Validation(format!(
                "A tournament named '{name}' already exists"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// Create a team
    pub async fn create_team(&self, name: String, power: Option<f64>) -> BracketResult<Team> {
        validate_name("name", &name)?;
        Ok(self.teams.create(Team::new(name, power)).await?)
    }

    pub async fn get_team(&self, team_id: TeamId) -> BracketResult<Team> {
        self.require_team(team_id).await
    }

    pub async fn list_teams(&self) -> BracketResult<Vec<Team>> {
        Ok(self.teams.all().await?)
    }

    /// Rename a team or change its power rating
    pub async fn update_team(&self, team_id: TeamId, patch: TeamPatch) -> BracketResult<Team> {
        let mut team = self.require_team(team_id).await?;

        if let Some(name) = patch.name {
            validate_name("name", &name)?;
            team.name = name;
        }
        if let Some(power) = patch.power {
            team.power = Some(power);
        }

        self.teams.save(&team).await?;
        Ok(team)
    }

    /// Delete a team that is not enrolled anywhere
    pub async fn delete_team(&self, team_id: TeamId) -> BracketResult<()> {
        let _catalog = self.catalog.lock().await;
        self.require_team(team_id).await?;

        let enrolled = self.enrollments.scan_where("team_id", team_id).await?;
        if !enrolled.is_empty() {
            return Err(BracketError::Conflict(format!(
                "Team {team_id} is enrolled in {} tournament(s)",
                enrolled.len()
            )));
        }

        self.teams.delete(team_id).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tournaments
    // ------------------------------------------------------------------

    /// Create a tournament, enroll its teams and seed the first round.
    ///
    /// A tournament created without teams is left unseeded; teams can be
    /// enrolled later and the bracket seeded with [`Self::seed_tournament`].
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad name/date/location, a duplicate name, a team
    ///   count other than 2, 4, 8 or 16, or a team listed twice
    /// - `NotFound` if a listed team does not exist
    pub async fn create_tournament(&self, new: NewTournament) -> BracketResult<TournamentBracket> {
        validate_name("name", &new.name)?;
        if let Some(location) = &new.location {
            validate_name("location", location)?;
        }
        validate_date(new.date, Utc::now().date_naive())?;

        if !new.teams.is_empty() && !is_valid_team_count(new.teams.len()) {
            return Err(BracketError::Validation(format!(
                "A bracket needs exactly 2, 4, 8 or 16 teams, got {}",
                new.teams.len()
            )));
        }

        let _catalog = self.catalog.lock().await;

        let mut seen = HashSet::with_capacity(new.teams.len());
        for &team_id in &new.teams {
            if !seen.insert(team_id) {
                return Err(BracketError::Validation(format!(
                    "Team {team_id} is listed more than once"
                )));
            }
            self.require_team(team_id).await?;
        }

        self.ensure_unique_name(&new.name, None).await?;

        let tournament = self
            .tournaments
            .create(Tournament::new(new.name, new.date, new.location))
            .await?;
        log::info!("Created tournament {} '{}'", tournament.id, tournament.name);

        if new.teams.is_empty() {
            return Ok(TournamentBracket {
                tournament,
                matches: Vec::new(),
            });
        }

        let _guard = self.locks.acquire(tournament.id).await;
        for &team_id in &new.teams {
            self.enrollments
                .create(Enrollment::new(tournament.id, team_id))
                .await?;
        }
        let matches = self
            .engine
            .seed_first_round(tournament.id, &new.teams)
            .await?;

        Ok(TournamentBracket {
            tournament,
            matches,
        })
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> BracketResult<Tournament> {
        self.require_tournament(tournament_id).await
    }

    /// Tournament with all of its matches
    pub async fn get_bracket(&self, tournament_id: TournamentId) -> BracketResult<TournamentBracket> {
        let tournament = self.require_tournament(tournament_id).await?;
        let matches = self.engine.matches_for(tournament_id).await?;
        Ok(TournamentBracket {
            tournament,
            matches,
        })
    }

    pub async fn list_tournaments(&self) -> BracketResult<Vec<Tournament>> {
        Ok(self.tournaments.all().await?)
    }

    /// Update name, date, location or status.
    ///
    /// Status only moves from active to completed, and only once the bracket
    /// has a champion.
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        patch: TournamentPatch,
    ) -> BracketResult<Tournament> {
        let _catalog = self.catalog.lock().await;
        let _guard = self.locks.acquire(tournament_id).await;
        let mut tournament = self.require_tournament(tournament_id).await?;

        if let Some(name) = patch.name {
            validate_name("name", &name)?;
            self.ensure_unique_name(&name, Some(tournament_id)).await?;
            tournament.name = name;
        }
        if let Some(location) = patch.location {
            validate_name("location", &location)?;
            tournament.location = Some(location);
        }
        if let Some(date) = patch.date {
            validate_date(Some(date), Utc::now().date_naive())?;
            tournament.date = Some(date);
        }

        match patch.status {
            Some(TournamentStatus::Active) if !tournament.is_active() => {
                return Err(BracketError::Conflict(format!(
                    "Tournament {tournament_id} is completed and cannot be reopened"
                )));
            }
            Some(TournamentStatus::Completed) if tournament.is_active() => {
                if self.engine.tournament_winner(tournament_id).await?.is_none() {
                    return Err(BracketError::Conflict(format!(
                        "Tournament {tournament_id} has no champion yet"
                    )));
                }
                tournament.complete();
            }
            _ => {}
        }

        self.tournaments.save(&tournament).await?;
        Ok(tournament)
    }

    /// Delete a tournament that has no matches, together with its enrollments.
    ///
    /// Brackets are never deleted implicitly: a seeded tournament is refused.
    pub async fn delete_tournament(&self, tournament_id: TournamentId) -> BracketResult<()> {
        {
            let _guard = self.locks.acquire(tournament_id).await;
            self.require_tournament(tournament_id).await?;

            let matches = self.engine.matches_for(tournament_id).await?;
            if !matches.is_empty() {
                return Err(BracketError::Conflict(format!(
                    "Tournament {tournament_id} has {} matches and cannot be deleted",
                    matches.len()
                )));
            }

            for enrollment in self
                .enrollments
                .scan_where("tournament_id", tournament_id)
                .await?
            {
                self.enrollments.delete(enrollment.id).await?;
            }
            self.tournaments.delete(tournament_id).await?;
        }

        self.locks.forget(tournament_id).await;
        log::info!("Deleted tournament {}", tournament_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Enrollment and seeding
    // ------------------------------------------------------------------

    /// Enroll a team into a tournament that has not been seeded yet
    pub async fn enroll_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> BracketResult<Enrollment> {
        let _catalog = self.catalog.lock().await;
        let _guard = self.locks.acquire(tournament_id).await;
        self.require_tournament(tournament_id).await?;
        self.require_team(team_id).await?;

        if !self.engine.matches_for(tournament_id).await?.is_empty() {
            return Err(BracketError::Conflict(format!(
                "Tournament {tournament_id} has already been seeded"
            )));
        }

        let enrolled = self
            .enrollments
            .scan_where("tournament_id", tournament_id)
            .await?;
        if enrolled.iter().any(|e| e.team_id == team_id) {
            return Err(BracketError::Conflict(format!(
                "Team {team_id} is already enrolled in tournament {tournament_id}"
            )));
        }
        if enrolled.len() >= MAX_TEAMS {
            return Err(BracketError::Validation(format!(
                "Tournament {tournament_id} already has the maximum of {MAX_TEAMS} teams"
            )));
        }

        let enrollment = self
            .enrollments
            .create(Enrollment::new(tournament_id, team_id))
            .await?;
        log::debug!("Team {} enrolled in tournament {}", team_id, tournament_id);
        Ok(enrollment)
    }

    /// Enrollments of a tournament with their teams
    pub async fn list_enrollments(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Vec<EnrollmentView>> {
        self.require_tournament(tournament_id).await?;

        let enrollments = self
            .enrollments
            .scan_where("tournament_id", tournament_id)
            .await?;

        let mut views = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let team = self.teams.find(enrollment.team_id).await?;
            views.push(EnrollmentView { enrollment, team });
        }
        Ok(views)
    }

    /// Seed the first round from the current enrollments
    pub async fn seed_tournament(&self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        let _guard = self.locks.acquire(tournament_id).await;
        self.require_tournament(tournament_id).await?;

        let team_ids: Vec<TeamId> = self
            .enrollments
            .scan_where("tournament_id", tournament_id)
            .await?
            .into_iter()
            .map(|e| e.team_id)
            .collect();

        if !is_valid_team_count(team_ids.len()) {
            return Err(BracketError::Validation(format!(
                "A bracket needs exactly 2, 4, 8 or 16 teams, tournament {tournament_id} has {}",
                team_ids.len()
            )));
        }

        self.engine.seed_first_round(tournament_id, &team_ids).await
    }

    // ------------------------------------------------------------------
    // Matches
    // ------------------------------------------------------------------

    /// Every match of a tournament
    pub async fn list_matches(&self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        self.require_tournament(tournament_id).await?;
        self.engine.matches_for(tournament_id).await
    }

    /// Champion of a tournament, if decided
    pub async fn tournament_winner(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<Team>> {
        self.require_tournament(tournament_id).await?;
        match self.engine.tournament_winner(tournament_id).await? {
            Some(team_id) => Ok(self.teams.find(team_id).await?),
            None => Ok(None),
        }
    }

    /// Record a match result and carry the bracket forward.
    ///
    /// Runs result recording, winner advancement, next-round generation and
    /// completion detection as one critical section for the tournament.
    /// Submitting the same result twice is safe.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the tournament or match is missing, or the match belongs
    ///   to another tournament
    /// - `Validation` for a tie or a match still missing a team
    /// - `Conflict` if the match already has a different result
    pub async fn submit_result(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        team_a_score: u32,
        team_b_score: u32,
    ) -> BracketResult<ResultOutcome> {
        let _guard = self.locks.acquire(tournament_id).await;
        self.require_tournament(tournament_id).await?;

        let target = self.engine.find_match(match_id).await?;
        if target.tournament_id != tournament_id {
            return Err(BracketError::not_found("Match", match_id));
        }

        let recorded = self
            .engine
            .record_result(match_id, team_a_score, team_b_score)
            .await?;
        self.engine.advance_winner(match_id).await?;
        let generated_matches = self
            .engine
            .generate_next_round(tournament_id, recorded.round)
            .await?;
        let tournament_completed = self
            .engine
            .complete_tournament_if_finished(tournament_id)
            .await?;
        let champion = self.engine.tournament_winner(tournament_id).await?;

        // Generation may have linked the match to its downstream match
        let completed_match = self.engine.find_match(match_id).await?;
        let next_round = completed_match.round + 1;
        let ready_matches = self
            .engine
            .round_matches(tournament_id, next_round)
            .await?
            .into_iter()
            .filter(Match::is_ready)
            .collect();

        Ok(ResultOutcome {
            next_match_id: completed_match.next_match_id,
            completed_match,
            next_round,
            generated_matches,
            tournament_completed,
            champion,
            ready_matches,
        })
    }
}
