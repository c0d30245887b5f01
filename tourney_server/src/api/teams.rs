//! Team management API handlers.
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/teams \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Red Foxes", "power": 72.5}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tourney::{bracket::Team, tournament::TeamPatch};

use super::{ApiResult, AppState, api_error};

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub power: Option<f64>,
}

/// List all teams.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<Team>>> {
    state
        .tournaments
        .list_teams()
        .await
        .map(Json)
        .map_err(api_error)
}

/// Create a team.
///
/// # Errors
///
/// - `400 Bad Request`: Name shorter than 2 or longer than 255 characters
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let team = state
        .tournaments
        .create_team(request.name, request.power)
        .await
        .map_err(api_error)?;

    tracing::info!(team_id = team.id, name = %team.name, "Team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// Get a team.
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> ApiResult<Json<Team>> {
    state
        .tournaments
        .get_team(team_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Rename a team or change its power rating.
pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(patch): Json<TeamPatch>,
) -> ApiResult<Json<Team>> {
    state
        .tournaments
        .update_team(team_id, patch)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Delete a team.
///
/// # Errors
///
/// - `404 Not Found`: Team doesn't exist
/// - `409 Conflict`: Team is enrolled in a tournament
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .tournaments
        .delete_team(team_id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
