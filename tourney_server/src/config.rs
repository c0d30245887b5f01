//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use tourney::store::DatabaseConfig;

/// Default bind address when neither `--bind` nor `SERVER_BIND` is set
pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

/// Entity store backing the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND".to_string(),
                reason: format!("Unknown backend '{other}' (expected 'memory' or 'postgres')"),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("memory"),
            StoreBackend::Postgres => f.write_str("postgres"),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Which entity store to use
    pub backend: StoreBackend,
    /// Database configuration, present when a database URL was given
    pub database: Option<DatabaseConfig>,
    /// Fixed seed for first-round shuffles; random when unset
    pub shuffle_seed: Option<u64>,
    /// Prometheus exporter address; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Command-line overrides, taking priority over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub backend: Option<StoreBackend>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env_required("SERVER_BIND")?
                .unwrap_or(DEFAULT_BIND),
        };

        let backend = match overrides.backend {
            Some(backend) => backend,
            None => match std::env::var("STORE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::default(),
            },
        };

        let database = overrides
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .map(|database_url| {
                let pool = DatabaseConfig::from_env();
                DatabaseConfig {
                    database_url,
                    ..pool
                }
            });

        Ok(ServerConfig {
            bind,
            backend,
            database,
            shuffle_seed: parse_env_required("SHUFFLE_SEED")?,
            metrics_bind: parse_env_required("METRICS_BIND")?,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Postgres && self.database.is_none() {
            return Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Required when STORE_BACKEND=postgres".to_string(),
            });
        }

        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Must not exceed max connections ({})",
                        database.max_connections
                    ),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional environment variable, rejecting unparseable values
fn parse_env_required<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
