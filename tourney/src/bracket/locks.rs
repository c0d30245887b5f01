//! Per-tournament critical sections.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::TournamentId;

/// Registry of one async mutex per tournament.
///
/// Holding the guard returned by [`TournamentLocks::acquire`] serializes every
/// bracket mutation of that tournament; other tournaments are unaffected.
#[derive(Clone, Default)]
pub struct TournamentLocks {
    locks: Arc<Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a tournament
    pub async fn acquire(&self, tournament_id: TournamentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(tournament_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock of a deleted tournament.
    ///
    /// Tasks already holding or waiting on the old mutex keep it, while a
    /// later `acquire` gets a fresh one. Only call this once the tournament is
    /// gone, so those tasks find nothing left to mutate.
    pub async fn forget(&self, tournament_id: TournamentId) {
        self.locks.lock().await.remove(&tournament_id);
    }

    /// Number of tournaments with a registered lock
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
