//! Bracket error types.

use thiserror::Error;

use crate::store::{EntityId, StoreError};

/// Bracket errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// Referenced tournament, team, match or enrollment does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// Input rejected (tied score, bad team count, bad name, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation clashes with the current bracket state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BracketError {
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store errors are sanitized so that SQL and record layout details stay
    /// internal.
    pub fn client_message(&self) -> String {
        match self {
            BracketError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
