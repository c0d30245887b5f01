//! Request tracking middleware.
//!
//! Records a request counter and latency histogram per matched route and
//! logs each completed request.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::{logging, metrics};

/// Label used for requests that matched no route
const UNMATCHED_PATH: &str = "unmatched";

/// Log and count every request by method, route template and status.
///
/// Route templates (`/api/v1/tournaments/{tournament_id}`) are used instead of
/// raw URIs so that metric labels stay bounded.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();
    metrics::http_requests_total(&method, &path, status);
    metrics::http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    logging::log_api_request(&method, &path, status, elapsed.as_millis() as u64);

    response
}
