//! HTTP server for tournament brackets.
//!
//! Exposes teams, tournaments, enrollments and match results from the
//! [`tourney`] library over a JSON API.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
