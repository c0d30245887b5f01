//! Tournament module: the service layer around the bracket engine.
//!
//! This module provides:
//! - Team creation, renaming and removal
//! - Tournament creation with immediate first-round seeding
//! - Enrollment of teams into unseeded tournaments
//! - Result submission that records, advances, generates and completes in
//!   one per-tournament critical section
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney::bracket::BracketSeeder;
//! use tourney::store::MemoryStore;
//! use tourney::tournament::{NewTournament, TournamentManager};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tourney::bracket::BracketError> {
//! let manager = TournamentManager::new(Arc::new(MemoryStore::new()), BracketSeeder::with_seed(7));
//!
//! let red = manager.create_team("Red".to_string(), None).await?;
//! let blue = manager.create_team("Blue".to_string(), None).await?;
//!
//! let bracket = manager
//!     .create_tournament(NewTournament {
//!         name: "Derby".to_string(),
//!         teams: vec![red.id, blue.id],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let final_match = &bracket.matches[0];
//! let outcome = manager
//!     .submit_result(bracket.tournament.id, final_match.id, 2, 1)
//!     .await?;
//! assert!(outcome.tournament_completed);
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod models;

pub use manager::TournamentManager;
pub use models::{
    EnrollmentView, MAX_NAME_LEN, MIN_NAME_LEN, NewTournament, ResultOutcome, TeamPatch,
    TournamentBracket, TournamentPatch,
};
