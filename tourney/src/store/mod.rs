//! Entity store: durable mapping from (collection, id) to a JSON record.
//!
//! Every bracket entity (team, tournament, enrollment, match) has the same
//! CRUD shape, so the backends only deal in type-erased JSON documents and
//! [`Repository`] layers the typed view on top:
//!
//! - [`MemoryStore`]: process-local store, used by tests and the default server
//! - [`PgStore`]: PostgreSQL-backed store (one JSONB table for all collections)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney::bracket::Team;
//! use tourney::store::{EntityStore, MemoryStore, Repository};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tourney::store::StoreError> {
//! let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
//! let teams = Repository::<Team>::new(store);
//!
//! let team = teams.create(Team::new("Lions", None)).await?;
//! assert_eq!(teams.find(team.id).await?, Some(team));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt::Debug;

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::{Database, PgStore};
pub use repository::Repository;

/// Identifier assigned by the store, increasing in creation order
pub type EntityId = i64;

/// A raw record as held by a backend
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Store-assigned identifier
    pub id: EntityId,
    /// JSON document
    pub data: Value,
}

/// A record type that can live in an [`EntityStore`]
pub trait Entity: Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection the records of this type are filed under
    const COLLECTION: &'static str;

    /// Identifier of this record (0 until it has been created)
    fn id(&self) -> EntityId;

    /// Overwrite the identifier with the one assigned by the store
    fn set_id(&mut self, id: EntityId);
}

/// Backend operations over type-erased JSON documents.
///
/// Scans and listings return records in creation order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Find a record by id
    async fn find(&self, collection: &str, id: EntityId) -> StoreResult<Option<Record>>;

    /// Insert a new record and return its assigned id
    async fn create(&self, collection: &str, data: Value) -> StoreResult<EntityId>;

    /// Replace an existing record
    async fn save(&self, collection: &str, id: EntityId, data: Value) -> StoreResult<()>;

    /// Records whose top-level `field` equals `value`
    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>>;

    /// Every record of a collection
    async fn all(&self, collection: &str) -> StoreResult<Vec<Record>>;

    /// Remove a record, returning whether it existed
    async fn delete(&self, collection: &str, id: EntityId) -> StoreResult<bool>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
