//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! forwards those records alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tourney_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a completed API request
///
/// Requests slower than one second are logged as warnings.
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "Slow API request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

/// Log a store failure hidden from the client behind a generic message
pub fn log_internal_error(context: &str, error: &dyn std::error::Error) {
    tracing::error!(context = context, error = %error, "Internal error");
}
