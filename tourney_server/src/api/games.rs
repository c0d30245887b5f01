//! Match API handlers.
//!
//! Submitting a result runs the whole progression pipeline: the winner is
//! recorded, advanced, the next round is generated once the current one is
//! decided, and the tournament is completed after the final.
//!
//! ```bash
//! curl -X PATCH http://localhost:8080/api/v1/tournaments/5/games/6 \
//!   -H "Content-Type: application/json" \
//!   -d '{"team_a_score": 3, "team_b_score": 1}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tourney::{bracket::Match, tournament::ResultOutcome};

use super::{ApiResult, AppState, api_error, request_id::RequestId};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct SubmitResultRequest {
    pub team_a_score: u32,
    pub team_b_score: u32,
}

/// List every match of a tournament.
pub async fn list_games(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<Vec<Match>>> {
    state
        .tournaments
        .list_matches(tournament_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Submit the final score of a match.
///
/// # Response
///
/// Returns `200 OK` with the outcome:
/// ```json
/// {
///   "completed_match": {"id": 7, "round": 1, "winner_id": 2, "next_match_id": 9, ...},
///   "next_match_id": 9,
///   "next_round": 2,
///   "generated_matches": [{"id": 9, "round": 2, ...}],
///   "tournament_completed": false,
///   "champion": null,
///   "ready_matches": [{"id": 9, "round": 2, ...}]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Tied score, or the match is still missing a team
/// - `404 Not Found`: Tournament or match doesn't exist, or the match belongs
///   to another tournament
/// - `409 Conflict`: A different result was already recorded
pub async fn submit_result(
    State(state): State<AppState>,
    Path((tournament_id, game_id)): Path<(i64, i64)>,
    request_id: RequestId,
    Json(request): Json<SubmitResultRequest>,
) -> ApiResult<Json<ResultOutcome>> {
    let outcome = state
        .tournaments
        .submit_result(
            tournament_id,
            game_id,
            request.team_a_score,
            request.team_b_score,
        )
        .await
        .map_err(api_error)?;

    metrics::results_recorded_total();
    if !outcome.generated_matches.is_empty() {
        metrics::rounds_generated_total();
    }
    if outcome.tournament_completed {
        metrics::tournaments_completed_total();
    }

    tracing::info!(
        request_id = %request_id.as_str(),
        tournament_id = tournament_id,
        game_id = game_id,
        winner_id = ?outcome.completed_match.winner_id,
        generated = outcome.generated_matches.len(),
        completed = outcome.tournament_completed,
        "Result submitted"
    );

    Ok(Json(outcome))
}
