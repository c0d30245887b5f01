//! Tournament API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - Creating tournaments, optionally enrolling and seeding teams at once
//! - Reading a tournament together with its bracket
//! - Enrolling teams and seeding the first round later
//! - Reading the champion
//!
//! # Examples
//!
//! Create and seed a four-team tournament:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Cup", "date": "2026-06-01", "location": "Hall B", "teams": [1, 2, 3, 4]}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney::{
    bracket::{Enrollment, Match, Team, Tournament, TournamentStatus},
    tournament::{EnrollmentView, NewTournament, TournamentBracket, TournamentPatch},
};

use super::{ApiResult, AppState, api_error};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct EnrollTeamRequest {
    pub team_id: i64,
}

#[derive(Debug, Serialize)]
pub struct WinnerResponse {
    pub tournament_id: i64,
    pub status: TournamentStatus,
    /// `null` until the final has been played
    pub winner: Option<Team>,
}

/// List all tournaments.
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Tournament>>> {
    state
        .tournaments
        .list_tournaments()
        .await
        .map(Json)
        .map_err(api_error)
}

/// Create a tournament.
///
/// When `teams` is non-empty the teams are enrolled and the first round is
/// seeded in the same request.
///
/// # Response
///
/// Returns `201 Created` with the tournament and its first-round matches:
/// ```json
/// {
///   "tournament": {"id": 5, "name": "Spring Cup", "status": "active", ...},
///   "matches": [{"id": 6, "round": 1, "team_a_id": 3, "team_b_id": 1, ...}]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Bad name/date/location, duplicate name, or a team
///   count other than 2, 4, 8 or 16
/// - `404 Not Found`: A listed team doesn't exist
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<NewTournament>,
) -> ApiResult<(StatusCode, Json<TournamentBracket>)> {
    let bracket = state
        .tournaments
        .create_tournament(request)
        .await
        .map_err(api_error)?;

    if !bracket.matches.is_empty() {
        metrics::brackets_seeded_total(bracket.matches.len() * 2);
    }
    Ok((StatusCode::CREATED, Json(bracket)))
}

/// Get a tournament with every match of its bracket.
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<TournamentBracket>> {
    state
        .tournaments
        .get_bracket(tournament_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Update name, date, location or status.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid field value
/// - `409 Conflict`: Reopening a completed tournament, or completing one
///   without a champion
pub async fn update_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    Json(patch): Json<TournamentPatch>,
) -> ApiResult<Json<Tournament>> {
    state
        .tournaments
        .update_tournament(tournament_id, patch)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Delete a tournament that has not been seeded.
///
/// # Errors
///
/// - `409 Conflict`: The tournament already has matches
pub async fn delete_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .tournaments
        .delete_tournament(tournament_id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List enrolled teams.
pub async fn list_enrollments(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<Vec<EnrollmentView>>> {
    state
        .tournaments
        .list_enrollments(tournament_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Enroll a team.
///
/// # Errors
///
/// - `400 Bad Request`: Tournament already has 16 teams
/// - `404 Not Found`: Tournament or team doesn't exist
/// - `409 Conflict`: Team already enrolled, or bracket already seeded
pub async fn enroll_team(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    Json(request): Json<EnrollTeamRequest>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = state
        .tournaments
        .enroll_team(tournament_id, request.team_id)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Seed the first round from the enrolled teams.
///
/// # Errors
///
/// - `400 Bad Request`: Enrolled team count is not 2, 4, 8 or 16
/// - `409 Conflict`: Bracket already seeded
pub async fn seed_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<Vec<Match>>)> {
    let matches = state
        .tournaments
        .seed_tournament(tournament_id)
        .await
        .map_err(api_error)?;

    metrics::brackets_seeded_total(matches.len() * 2);
    Ok((StatusCode::CREATED, Json(matches)))
}

/// Get the champion.
///
/// Returns `200 OK` with `"winner": null` while the tournament is running.
pub async fn get_winner(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<WinnerResponse>> {
    let tournament = state
        .tournaments
        .get_tournament(tournament_id)
        .await
        .map_err(api_error)?;
    let winner = state
        .tournaments
        .tournament_winner(tournament_id)
        .await
        .map_err(api_error)?;

    Ok(Json(WinnerResponse {
        tournament_id,
        status: tournament.status,
        winner,
    }))
}
