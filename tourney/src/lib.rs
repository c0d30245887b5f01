//! # Tourney
//!
//! Single-elimination tournament brackets with mechanical round progression.
//!
//! A tournament enrolls 2, 4, 8 or 16 teams. Seeding shuffles them into
//! first-round matches; every recorded result then flows through the same
//! pipeline:
//!
//! - **Record**: store the score and derive the winner (ties are rejected)
//! - **Advance**: place the winner into the downstream match, if linked
//! - **Generate**: once a round is fully decided, pair its winners into the
//!   next round and link both source matches to each new match
//! - **Complete**: when the sole final-round match is decided, the tournament
//!   has its champion and moves to `completed`
//!
//! ## Core Modules
//!
//! - [`bracket`]: Data model, seeding and the progression engine
//! - [`tournament`]: Team/tournament/enrollment service with per-tournament locking
//! - [`store`]: Entity store backends (in-memory, PostgreSQL) and typed repositories

/// Bracket data model and progression engine.
pub mod bracket;
pub use bracket::{BracketEngine, BracketError, BracketResult, BracketSeeder};

/// Entity store backends and repositories.
pub mod store;

/// Service layer for teams, tournaments and result submission.
pub mod tournament;
pub use tournament::TournamentManager;
