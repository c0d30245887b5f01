//! PostgreSQL connection pooling and the JSONB-backed entity store.
//!
//! All collections share one table:
//!
//! ```sql
//! CREATE TABLE entities (
//!     id         BIGSERIAL PRIMARY KEY,
//!     collection TEXT  NOT NULL,
//!     data       JSONB NOT NULL
//! );
//! ```

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use super::{DatabaseConfig, EntityId, EntityStore, Record, StoreError, StoreResult};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tourney::store::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     db.health_check().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Entity store persisting every collection into the `entities` table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `entities` table and its collection index if missing
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                id BIGSERIAL PRIMARY KEY,
                collection TEXT NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS entities_collection_idx ON entities (collection, id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn to_record(row: &PgRow) -> StoreResult<Record> {
    Ok(Record {
        id: row.try_get("id")?,
        data: row.try_get("data")?,
    })
}

#[async_trait]
impl EntityStore for PgStore {
    async fn find(&self, collection: &str, id: EntityId) -> StoreResult<Option<Record>> {
        let row = sqlx::query("SELECT id, data FROM entities WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(to_record).transpose()
    }

    async fn create(&self, collection: &str, data: Value) -> StoreResult<EntityId> {
        // The id is reserved first so the stored document carries it too.
        let row = sqlx::query(
            r#"
            WITH next AS (SELECT nextval(pg_get_serial_sequence('entities', 'id')) AS id)
            INSERT INTO entities (id, collection, data)
            SELECT next.id, $1, jsonb_set($2::jsonb, '{id}', to_jsonb(next.id))
            FROM next
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn save(&self, collection: &str, id: EntityId, data: Value) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE entities
            SET data = jsonb_set($3::jsonb, '{id}', to_jsonb(id))
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                collection: collection.to_string(),
                id,
            });
        }

        Ok(())
    }

    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT id, data FROM entities
            WHERE collection = $1 AND data -> $2 = $3::jsonb
            ORDER BY id
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_record).collect()
    }

    async fn all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let rows = sqlx::query("SELECT id, data FROM entities WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(to_record).collect()
    }

    async fn delete(&self, collection: &str, id: EntityId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM entities WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
