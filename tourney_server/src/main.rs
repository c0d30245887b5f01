//! Tournament bracket server.
//!
//! Serves the bracket API over HTTP, backed by either the in-memory store or
//! PostgreSQL.

use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use tourney::{
    BracketSeeder, TournamentManager,
    store::{Database, EntityStore, MemoryStore, PgStore},
};
use tourney_server::{
    api,
    config::{Overrides, ServerConfig, StoreBackend},
    logging, metrics,
};

const HELP: &str = "\
Run a single-elimination tournament bracket server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --store      BACKEND     memory or postgres          [default: env STORE_BACKEND or memory]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORE_BACKEND            memory | postgres
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size settings (also DB_MIN_CONNECTIONS, DB_*_TIMEOUT)
  SHUFFLE_SEED             Fixed seed for first-round pairings
  METRICS_BIND             Prometheus exporter address (e.g., 127.0.0.1:9090)
  RUST_LOG                 Log filter (default: info,sqlx=warn,hyper=warn)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        backend: pargs.opt_value_from_str("--store")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    tracing::info!(
        bind = %config.bind,
        backend = %config.backend,
        "Starting tournament server"
    );

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        tracing::info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    let store = build_store(&config).await?;

    let seeder = match config.shuffle_seed {
        Some(seed) => {
            tracing::info!(seed, "Using fixed shuffle seed");
            BracketSeeder::with_seed(seed)
        }
        None => BracketSeeder::new(),
    };

    let state = api::AppState {
        tournaments: Arc::new(TournamentManager::new(store.clone(), seeder)),
        store,
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");

    Ok(())
}

/// Build the configured entity store
async fn build_store(config: &ServerConfig) -> Result<Arc<dyn EntityStore>, Error> {
    match (config.backend, &config.database) {
        (StoreBackend::Postgres, Some(db_config)) => {
            tracing::info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;

            let store = PgStore::new(db.pool().clone());
            store.migrate().await.context("Failed to prepare schema")?;
            tracing::info!("Database connected successfully");

            Ok(Arc::new(store))
        }
        (StoreBackend::Postgres, None) => Err(Error::msg("DATABASE_URL is required for postgres")),
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
