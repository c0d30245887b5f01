//! Single-elimination bracket engine.
//!
//! This module turns a flat list of enrolled teams into a tree of matches and
//! propagates results round by round:
//! - First-round seeding with an injectable random source
//! - Result recording with winner derivation
//! - Winner advancement into the downstream match
//! - Next-round generation once a round is fully decided
//! - Champion detection and tournament completion
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney::bracket::{BracketEngine, BracketSeeder, Tournament};
//! use tourney::store::{EntityStore, MemoryStore, Repository};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tourney::bracket::BracketError> {
//! let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
//! let tournament = Repository::<Tournament>::new(store.clone())
//!     .create(Tournament::new("Final Four", None, None))
//!     .await?;
//!
//! let engine = BracketEngine::new(store, BracketSeeder::with_seed(1));
//! let semis = engine.seed_first_round(tournament.id, &[11, 12, 13, 14]).await?;
//!
//! for m in &semis {
//!     engine.record_result(m.id, 3, 1).await?;
//! }
//! let final_round = engine.generate_next_round(tournament.id, 1).await?;
//! engine.record_result(final_round[0].id, 0, 2).await?;
//!
//! assert!(engine.tournament_winner(tournament.id).await?.is_some());
//! assert!(engine.complete_tournament_if_finished(tournament.id).await?);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod errors;
pub mod locks;
pub mod models;
pub mod rounds;
pub mod seeder;

pub use engine::BracketEngine;
pub use errors::{BracketError, BracketResult};
pub use locks::TournamentLocks;
pub use models::{
    Enrollment, EnrollmentId, MAX_TEAMS, Match, MatchId, Slot, Team, TeamId, Tournament,
    TournamentId, TournamentStatus, VALID_TEAM_COUNTS, is_valid_team_count,
};
pub use rounds::{PlannedMatch, RoundPlan, SkipReason};
pub use seeder::BracketSeeder;
