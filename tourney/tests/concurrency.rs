//! Concurrent result submission.
//!
//! Sibling matches decided at the same moment must still produce exactly one
//! next round, and rules spanning tournaments must hold under parallel calls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tourney::bracket::{BracketError, BracketSeeder, Match};
use tourney::store::{EntityId, EntityStore, MemoryStore, Record, StoreResult};
use tourney::tournament::{NewTournament, TournamentManager, TournamentPatch};

/// Memory store whose reads yield for a while, widening check-then-write windows
#[derive(Default)]
struct SlowReadStore {
    inner: MemoryStore,
}

impl SlowReadStore {
    async fn pause() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[async_trait]
impl EntityStore for SlowReadStore {
    async fn find(&self, collection: &str, id: EntityId) -> StoreResult<Option<Record>> {
        let found = self.inner.find(collection, id).await;
        Self::pause().await;
        found
    }

    async fn create(&self, collection: &str, data: Value) -> StoreResult<EntityId> {
        self.inner.create(collection, data).await
    }

    async fn save(&self, collection: &str, id: EntityId, data: Value) -> StoreResult<()> {
        self.inner.save(collection, id, data).await
    }

    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        let records = self.inner.scan_where(collection, field, value).await;
        Self::pause().await;
        records
    }

    async fn all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        self.inner.all(collection).await
    }

    async fn delete(&self, collection: &str, id: EntityId) -> StoreResult<bool> {
        self.inner.delete(collection, id).await
    }
}

fn slow_manager() -> TournamentManager {
    TournamentManager::new(Arc::new(SlowReadStore::default()), BracketSeeder::with_seed(5))
}

async fn seeded_tournament(size: usize, seed: u64) -> (TournamentManager, i64, Vec<Match>) {
    let manager =
        TournamentManager::new(Arc::new(MemoryStore::new()), BracketSeeder::with_seed(seed));

    let mut team_ids = Vec::with_capacity(size);
    for i in 0..size {
        let team = manager
            .create_team(format!("Squad {i:02}"), None)
            .await
            .unwrap();
        team_ids.push(team.id);
    }

    let bracket = manager
        .create_tournament(NewTournament {
            name: format!("Concurrent {seed}"),
            teams: team_ids,
            ..Default::default()
        })
        .await
        .unwrap();

    (manager, bracket.tournament.id, bracket.matches)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sibling_results_generate_one_round() {
    for seed in 0..10 {
        let (manager, tid, first_round) = seeded_tournament(8, seed).await;

        let handles: Vec<_> = first_round
            .iter()
            .map(|m| {
                let manager = manager.clone();
                let match_id = m.id;
                tokio::spawn(async move { manager.submit_result(tid, match_id, 4, 2).await })
            })
            .collect();

        let mut generated = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            generated += outcome.generated_matches.len();
        }

        let second_round = manager.engine().round_matches(tid, 2).await.unwrap();
        assert_eq!(generated, 2, "seed {seed}");
        assert_eq!(second_round.len(), 2, "seed {seed}");

        // Each winner appears exactly once in round 2
        let placed: HashSet<_> = second_round
            .iter()
            .flat_map(|m| [m.team_a_id.unwrap(), m.team_b_id.unwrap()])
            .collect();
        let winners: HashSet<_> = first_round.iter().map(|m| m.team_a_id.unwrap()).collect();
        assert_eq!(placed, winners);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_submissions_are_idempotent() {
    let (manager, tid, first_round) = seeded_tournament(2, 77).await;
    let final_id = first_round[0].id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.submit_result(tid, final_id, 1, 0).await })
        })
        .collect();

    let mut completions = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().tournament_completed {
            completions += 1;
        }
    }

    assert_eq!(completions, 1);
    assert_eq!(manager.list_matches(tid).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_tournaments_progress_in_parallel() {
    let mut tournaments = Vec::new();
    for seed in 100..104 {
        tournaments.push(seeded_tournament(4, seed).await);
    }

    let handles: Vec<_> = tournaments
        .into_iter()
        .map(|(manager, tid, first_round)| {
            tokio::spawn(async move {
                for m in &first_round {
                    manager.submit_result(tid, m.id, 0, 1).await.unwrap();
                }
                let final_match = manager.engine().round_matches(tid, 2).await.unwrap();
                assert_eq!(final_match.len(), 1);
                let outcome = manager
                    .submit_result(tid, final_match[0].id, 2, 1)
                    .await
                    .unwrap();
                outcome.tournament_completed
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_keep_names_unique() {
    let manager = slow_manager();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move {
                manager
                    .create_tournament(NewTournament {
                        name: "Spring Cup".to_string(),
                        ..Default::default()
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, BracketError::Validation(_)), "{err}"),
        }
    }

    assert_eq!(created, 1);
    let named = manager
        .list_tournaments()
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.name == "Spring Cup")
        .count();
    assert_eq!(named, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renames_keep_names_unique() {
    let manager = slow_manager();

    let mut ids = Vec::new();
    for name in ["North Cup", "South Cup", "East Cup"] {
        let bracket = manager
            .create_tournament(NewTournament {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        ids.push(bracket.tournament.id);
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|tid| {
            let manager = manager.clone();
            tokio::spawn(async move {
                manager
                    .update_tournament(
                        tid,
                        TournamentPatch {
                            name: Some("Unified Cup".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            })
        })
        .collect();

    let mut renamed = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            renamed += 1;
        }
    }

    assert_eq!(renamed, 1);
    let named = manager
        .list_tournaments()
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.name == "Unified Cup")
        .count();
    assert_eq!(named, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enrollment_never_outlives_deleted_team() {
    let manager = slow_manager();

    for round in 0..8 {
        let team_id = manager
            .create_team(format!("Racer {round}"), None)
            .await
            .unwrap()
            .id;
        let tid = manager
            .create_tournament(NewTournament {
                name: format!("Race Cup {round}"),
                ..Default::default()
            })
            .await
            .unwrap()
            .tournament
            .id;

        let enroll = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.enroll_team(tid, team_id).await })
        };
        let delete = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.delete_team(team_id).await })
        };

        let enrolled = enroll.await.unwrap();
        let deleted = delete.await.unwrap();

        // Exactly one side wins: enrolled teams cannot be deleted, deleted
        // teams cannot be enrolled
        match (&enrolled, &deleted) {
            (Ok(_), Err(BracketError::Conflict(_))) => {
                assert!(manager.get_team(team_id).await.is_ok());
            }
            (Err(BracketError::NotFound { entity: "Team", .. }), Ok(())) => {
                assert!(manager.list_enrollments(tid).await.unwrap().is_empty());
            }
            other => panic!("round {round}: unexpected outcome {other:?}"),
        }

        for view in manager.list_enrollments(tid).await.unwrap() {
            assert!(view.team.is_some(), "round {round}: dangling enrollment");
        }
    }
}
