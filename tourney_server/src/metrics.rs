//! Prometheus metrics for bracket progression and HTTP traffic.
//!
//! Metrics are exposed in Prometheus text format for scraping when
//! `METRICS_BIND` is configured. Without an installed exporter every
//! recording call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("PATCH", "/api/v1/tournaments/{id}/games/{game_id}", 200);
//! metrics::results_recorded_total();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template, not the raw URI, to keep
/// label cardinality bounded.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Bracket Metrics
// ============================================================================

/// Increment match results recorded counter.
pub fn results_recorded_total() {
    metrics::counter!("results_recorded_total").increment(1);
}

/// Increment generated rounds counter.
pub fn rounds_generated_total() {
    metrics::counter!("rounds_generated_total").increment(1);
}

/// Increment completed tournaments counter.
pub fn tournaments_completed_total() {
    metrics::counter!("tournaments_completed_total").increment(1);
}

/// Increment seeded brackets counter, labelled by team count.
pub fn brackets_seeded_total(teams: usize) {
    metrics::counter!("brackets_seeded_total",
        "teams" => teams.to_string()
    )
    .increment(1);
}
