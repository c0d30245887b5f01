//! Entity store error types.

use thiserror::Error;

use super::EntityId;

/// Entity store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Save targeted a record that does not exist
    #[error("Record {collection}/{id} does not exist")]
    Missing { collection: String, id: EntityId },
}

/// Result type for entity store operations
pub type StoreResult<T> = Result<T, StoreError>;
