//! HTTP API for the tournament server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP
//! - **Tower**: Middleware for CORS, request IDs and request tracking
//! - **TournamentManager**: Bracket state behind per-tournament locks
//!
//! # Modules
//!
//! - [`teams`]: Team management (create, list, rename, delete)
//! - [`tournaments`]: Tournaments, enrollments, seeding and champions
//! - [`games`]: Match listing and result submission
//! - [`middleware`]: Request logging and metrics
//! - [`request_id`]: Request correlation IDs
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tourney::bracket::BracketSeeder;
//! use tourney::store::{EntityStore, MemoryStore};
//! use tourney::tournament::TournamentManager;
//! use tourney_server::api::{create_router, AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
//! let state = AppState {
//!     tournaments: Arc::new(TournamentManager::new(store.clone(), BracketSeeder::new())),
//!     store,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod games;
pub mod middleware;
pub mod request_id;
pub mod teams;
pub mod tournaments;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tourney::{BracketError, TournamentManager, store::EntityStore};
use tower_http::cors::CorsLayer;

use crate::logging;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub tournaments: Arc<TournamentManager>,
    /// Store backing the manager, probed by the health check
    pub store: Arc<dyn EntityStore>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Map a bracket error to its status code and client-safe body
pub fn api_error(err: BracketError) -> ApiError {
    let status = match &err {
        BracketError::NotFound { .. } => StatusCode::NOT_FOUND,
        BracketError::Validation(_) => StatusCode::BAD_REQUEST,
        BracketError::Conflict(_) => StatusCode::CONFLICT,
        BracketError::Store(_) => {
            logging::log_internal_error("store", &err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                                       - Health check
/// GET    /api/v1/teams                                 - List teams
/// POST   /api/v1/teams                                 - Create team
/// GET    /api/v1/teams/{id}                            - Get team
/// PATCH  /api/v1/teams/{id}                            - Update team
/// DELETE /api/v1/teams/{id}                            - Delete team
/// GET    /api/v1/tournaments                           - List tournaments
/// POST   /api/v1/tournaments                           - Create (and seed) tournament
/// GET    /api/v1/tournaments/{id}                      - Tournament with its bracket
/// PATCH  /api/v1/tournaments/{id}                      - Update tournament
/// DELETE /api/v1/tournaments/{id}                      - Delete unseeded tournament
/// GET    /api/v1/tournaments/{id}/teams                - List enrollments
/// POST   /api/v1/tournaments/{id}/teams                - Enroll team
/// POST   /api/v1/tournaments/{id}/seed                 - Seed first round
/// GET    /api/v1/tournaments/{id}/games                - List matches
/// PATCH  /api/v1/tournaments/{id}/games/{game_id}      - Submit result
/// GET    /api/v1/tournaments/{id}/winner               - Champion
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/{team_id}",
            get(teams::get_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{tournament_id}",
            get(tournaments::get_tournament)
                .patch(tournaments::update_tournament)
                .delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/teams",
            get(tournaments::list_enrollments).post(tournaments::enroll_team),
        )
        .route(
            "/tournaments/{tournament_id}/seed",
            post(tournaments::seed_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/winner",
            get(tournaments::get_winner),
        )
        .route("/tournaments/{tournament_id}/games", get(games::list_games))
        .route(
            "/tournaments/{tournament_id}/games/{game_id}",
            patch(games::submit_result),
        )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` if the store is reachable, or `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.3.0","store":true,"timestamp":"2026-05-10T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store.health_check().await.is_ok();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
