//! Integration tests for bracket progression.
//!
//! These tests drive the tournament manager through complete brackets on the
//! in-memory store: seeding, result submission, next-round generation and
//! tournament completion.

use std::collections::HashSet;
use std::sync::Arc;

use tourney::bracket::{BracketError, BracketSeeder, Match, Team, TournamentStatus};
use tourney::store::MemoryStore;
use tourney::tournament::{NewTournament, TournamentManager, TournamentPatch};

/// Helper to create a manager with a deterministic seeder
fn setup(seed: u64) -> TournamentManager {
    TournamentManager::new(Arc::new(MemoryStore::new()), BracketSeeder::with_seed(seed))
}

/// Helper to create `count` teams
async fn create_teams(manager: &TournamentManager, count: usize) -> Vec<Team> {
    let mut teams = Vec::with_capacity(count);
    for i in 0..count {
        let team = manager
            .create_team(format!("Team {}", i + 1), Some(50.0 + i as f64))
            .await
            .unwrap();
        teams.push(team);
    }
    teams
}

fn new_tournament(name: &str, teams: &[Team]) -> NewTournament {
    NewTournament {
        name: name.to_string(),
        teams: teams.iter().map(|t| t.id).collect(),
        ..Default::default()
    }
}

/// Play every playable match until nothing is left, team A always winning.
///
/// Returns how many submissions reported completing the tournament.
async fn play_out(manager: &TournamentManager, tournament_id: i64) -> usize {
    let mut completions = 0;
    loop {
        let pending: Vec<Match> = manager
            .list_matches(tournament_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.is_ready() && !m.is_decided())
            .collect();

        if pending.is_empty() {
            return completions;
        }

        for m in pending {
            let outcome = manager
                .submit_result(tournament_id, m.id, 3, 1)
                .await
                .unwrap();
            if outcome.tournament_completed {
                completions += 1;
            }
        }
    }
}

// ============================================================================
// Four-team walkthrough
// ============================================================================

#[tokio::test]
async fn test_four_team_bracket_walkthrough() {
    let manager = setup(42);
    let teams = create_teams(&manager, 4).await;

    let bracket = manager
        .create_tournament(new_tournament("Spring Cup", &teams))
        .await
        .unwrap();
    let tid = bracket.tournament.id;

    // Seeding: two ready first-round matches covering every team once
    assert_eq!(bracket.matches.len(), 2);
    let mut seeded = HashSet::new();
    for m in &bracket.matches {
        assert_eq!(m.round, 1);
        assert!(m.is_ready());
        assert!(!m.is_decided());
        assert!(m.next_match_id.is_none());
        seeded.insert(m.team_a_id.unwrap());
        seeded.insert(m.team_b_id.unwrap());
    }
    assert_eq!(seeded, teams.iter().map(|t| t.id).collect::<HashSet<_>>());

    let (first, second) = (&bracket.matches[0], &bracket.matches[1]);

    // First semifinal: nothing to generate yet
    let outcome = manager.submit_result(tid, first.id, 2, 1).await.unwrap();
    assert_eq!(outcome.completed_match.winner_id, first.team_a_id);
    assert!(outcome.generated_matches.is_empty());
    assert!(outcome.next_match_id.is_none());
    assert!(outcome.ready_matches.is_empty());
    assert!(!outcome.tournament_completed);
    assert!(outcome.champion.is_none());

    // Second semifinal: the final is generated and both semis link to it
    let outcome = manager.submit_result(tid, second.id, 0, 4).await.unwrap();
    assert_eq!(outcome.completed_match.winner_id, second.team_b_id);
    assert_eq!(outcome.generated_matches.len(), 1);
    assert_eq!(outcome.next_round, 2);

    let final_match = outcome.generated_matches[0].clone();
    assert_eq!(final_match.round, 2);
    assert_eq!(final_match.team_a_id, first.team_a_id);
    assert_eq!(final_match.team_b_id, second.team_b_id);
    assert_eq!(outcome.next_match_id, Some(final_match.id));
    assert_eq!(outcome.ready_matches, vec![final_match.clone()]);

    let reloaded = manager.list_matches(tid).await.unwrap();
    for m in reloaded.iter().filter(|m| m.round == 1) {
        assert_eq!(m.next_match_id, Some(final_match.id));
    }

    // Tournament still running
    assert_eq!(
        manager.get_tournament(tid).await.unwrap().status,
        TournamentStatus::Active
    );
    assert!(manager.tournament_winner(tid).await.unwrap().is_none());

    // Final
    let outcome = manager
        .submit_result(tid, final_match.id, 1, 5)
        .await
        .unwrap();
    assert!(outcome.tournament_completed);
    assert!(outcome.generated_matches.is_empty());
    assert_eq!(outcome.champion, second.team_b_id);

    let tournament = manager.get_tournament(tid).await.unwrap();
    assert_eq!(tournament.status, TournamentStatus::Completed);

    let champion = manager.tournament_winner(tid).await.unwrap().unwrap();
    assert_eq!(Some(champion.id), second.team_b_id);
    assert_eq!(manager.list_matches(tid).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_two_team_bracket_is_a_single_final() {
    let manager = setup(3);
    let teams = create_teams(&manager, 2).await;

    let bracket = manager
        .create_tournament(new_tournament("Derby", &teams))
        .await
        .unwrap();
    assert_eq!(bracket.matches.len(), 1);

    let m = &bracket.matches[0];
    let outcome = manager
        .submit_result(bracket.tournament.id, m.id, 1, 0)
        .await
        .unwrap();

    assert!(outcome.tournament_completed);
    assert_eq!(outcome.champion, m.team_a_id);
    assert!(outcome.generated_matches.is_empty());
}

// ============================================================================
// Larger brackets
// ============================================================================

#[tokio::test]
async fn test_full_brackets_complete_exactly_once() {
    for (size, seed) in [(8usize, 11u64), (16, 12)] {
        let manager = setup(seed);
        let teams = create_teams(&manager, size).await;
        let bracket = manager
            .create_tournament(new_tournament(&format!("Open {size}"), &teams))
            .await
            .unwrap();
        let tid = bracket.tournament.id;

        let completions = play_out(&manager, tid).await;
        assert_eq!(completions, 1, "{size}-team bracket completed {completions} times");

        let matches = manager.list_matches(tid).await.unwrap();
        assert_eq!(matches.len(), size - 1);
        assert!(matches.iter().all(Match::is_decided));

        // Every round halves the previous one
        let rounds = matches.iter().map(|m| m.round).max().unwrap();
        assert_eq!(2usize.pow(rounds), size);
        for round in 1..=rounds {
            let count = matches.iter().filter(|m| m.round == round).count();
            assert_eq!(count, size >> round);
        }

        // Every non-final match feeds a match of the next round
        for m in matches.iter().filter(|m| m.round < rounds) {
            let next_id = m.next_match_id.expect("non-final match must be linked");
            let next = matches.iter().find(|n| n.id == next_id).unwrap();
            assert_eq!(next.round, m.round + 1);
            assert!(next.has_team(m.winner_id.unwrap()));
        }

        let champion = manager.tournament_winner(tid).await.unwrap().unwrap();
        assert!(teams.iter().any(|t| t.id == champion.id));
        assert_eq!(
            manager.get_tournament(tid).await.unwrap().status,
            TournamentStatus::Completed
        );
    }
}

#[tokio::test]
async fn test_sibling_submission_order_does_not_change_next_round() {
    let mut finals = Vec::new();

    for reverse in [false, true] {
        let manager = setup(99);
        let teams = create_teams(&manager, 4).await;
        let bracket = manager
            .create_tournament(new_tournament("Mirror Cup", &teams))
            .await
            .unwrap();

        let mut semis = bracket.matches.clone();
        if reverse {
            semis.reverse();
        }

        let mut generated = Vec::new();
        for m in &semis {
            let outcome = manager
                .submit_result(bracket.tournament.id, m.id, 5, 2)
                .await
                .unwrap();
            generated.extend(outcome.generated_matches);
        }

        assert_eq!(generated.len(), 1);
        finals.push((generated[0].team_a_id, generated[0].team_b_id));
    }

    assert_eq!(finals[0], finals[1]);
}

// ============================================================================
// Result submission edge cases
// ============================================================================

#[tokio::test]
async fn test_result_edge_cases() {
    let manager = setup(5);
    let teams = create_teams(&manager, 4).await;
    let bracket = manager
        .create_tournament(new_tournament("Edge Cup", &teams))
        .await
        .unwrap();
    let tid = bracket.tournament.id;
    let m = &bracket.matches[0];

    // Ties are rejected and leave the match untouched
    let err = manager.submit_result(tid, m.id, 2, 2).await.unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));
    assert!(!manager.engine().find_match(m.id).await.unwrap().is_decided());

    // Recording twice with the same score is harmless
    manager.submit_result(tid, m.id, 2, 0).await.unwrap();
    let again = manager.submit_result(tid, m.id, 2, 0).await.unwrap();
    assert_eq!(again.completed_match.winner_id, m.team_a_id);
    assert!(again.generated_matches.is_empty());

    // A different score for a decided match is a conflict
    let err = manager.submit_result(tid, m.id, 0, 2).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    // Unknown match
    let err = manager.submit_result(tid, 9_999, 1, 0).await.unwrap_err();
    assert!(matches!(err, BracketError::NotFound { entity: "Match", .. }));

    // Unknown tournament
    let err = manager.submit_result(9_999, m.id, 1, 0).await.unwrap_err();
    assert!(matches!(
        err,
        BracketError::NotFound {
            entity: "Tournament",
            ..
        }
    ));
}

#[tokio::test]
async fn test_match_from_another_tournament_is_not_found() {
    let manager = setup(8);
    let teams = create_teams(&manager, 4).await;

    let first = manager
        .create_tournament(new_tournament("League A", &teams[..2]))
        .await
        .unwrap();
    let second = manager
        .create_tournament(new_tournament("League B", &teams[2..]))
        .await
        .unwrap();

    let err = manager
        .submit_result(second.tournament.id, first.matches[0].id, 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::NotFound { entity: "Match", .. }));
}

#[tokio::test]
async fn test_regenerating_a_round_is_a_no_op() {
    let manager = setup(21);
    let teams = create_teams(&manager, 4).await;
    let bracket = manager
        .create_tournament(new_tournament("Repeat Cup", &teams))
        .await
        .unwrap();
    let tid = bracket.tournament.id;

    for m in &bracket.matches {
        manager.submit_result(tid, m.id, 1, 0).await.unwrap();
    }

    let engine = manager.engine();
    assert!(engine.generate_next_round(tid, 1).await.unwrap().is_empty());
    assert_eq!(engine.round_matches(tid, 2).await.unwrap().len(), 1);
}

// ============================================================================
// Tournament lifecycle
// ============================================================================

#[tokio::test]
async fn test_enroll_then_seed() {
    let manager = setup(13);
    let teams = create_teams(&manager, 5).await;

    let bracket = manager
        .create_tournament(new_tournament("Late Entry", &[]))
        .await
        .unwrap();
    let tid = bracket.tournament.id;
    assert!(bracket.matches.is_empty());

    // Three teams cannot be seeded
    for team in &teams[..3] {
        manager.enroll_team(tid, team.id).await.unwrap();
    }
    let err = manager.seed_tournament(tid).await.unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    let err = manager.enroll_team(tid, teams[0].id).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    manager.enroll_team(tid, teams[3].id).await.unwrap();
    let enrollments = manager.list_enrollments(tid).await.unwrap();
    assert_eq!(enrollments.len(), 4);
    assert!(enrollments.iter().all(|e| e.team.is_some()));

    let matches = manager.seed_tournament(tid).await.unwrap();
    assert_eq!(matches.len(), 2);

    // Seeded brackets are frozen
    let err = manager.seed_tournament(tid).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));
    let err = manager.enroll_team(tid, teams[4].id).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));
}

#[tokio::test]
async fn test_create_tournament_validation() {
    let manager = setup(1);
    let teams = create_teams(&manager, 4).await;

    let err = manager
        .create_tournament(new_tournament("Odd Cup", &teams[..3]))
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    let mut duplicated = new_tournament("Twice Cup", &teams[..2]);
    duplicated.teams[1] = duplicated.teams[0];
    let err = manager.create_tournament(duplicated).await.unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    let mut missing = new_tournament("Ghost Cup", &teams[..2]);
    missing.teams[1] = 9_999;
    let err = manager.create_tournament(missing).await.unwrap_err();
    assert!(matches!(err, BracketError::NotFound { entity: "Team", .. }));

    let mut past = new_tournament("Past Cup", &teams[..2]);
    past.date = chrono::NaiveDate::from_ymd_opt(2000, 1, 1);
    let err = manager.create_tournament(past).await.unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    let err = manager
        .create_tournament(new_tournament("X", &teams[..2]))
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    manager
        .create_tournament(new_tournament("Unique Cup", &teams[..2]))
        .await
        .unwrap();
    let err = manager
        .create_tournament(new_tournament("Unique Cup", &teams[2..]))
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::Validation(_)));

    // Only the successful creation left anything behind
    assert_eq!(manager.list_tournaments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_status_transitions() {
    let manager = setup(2);
    let teams = create_teams(&manager, 2).await;
    let bracket = manager
        .create_tournament(new_tournament("Status Cup", &teams))
        .await
        .unwrap();
    let tid = bracket.tournament.id;

    let complete = TournamentPatch {
        status: Some(TournamentStatus::Completed),
        ..Default::default()
    };
    let err = manager
        .update_tournament(tid, complete.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    manager
        .submit_result(tid, bracket.matches[0].id, 3, 0)
        .await
        .unwrap();

    // Already completed by the final result; completing again is harmless
    let tournament = manager.update_tournament(tid, complete).await.unwrap();
    assert_eq!(tournament.status, TournamentStatus::Completed);

    let reopen = TournamentPatch {
        status: Some(TournamentStatus::Active),
        ..Default::default()
    };
    let err = manager.update_tournament(tid, reopen).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    let renamed = manager
        .update_tournament(
            tid,
            TournamentPatch {
                name: Some("Status Cup Final".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Status Cup Final");
    assert_eq!(renamed.status, TournamentStatus::Completed);
}

#[tokio::test]
async fn test_deletion_rules() {
    let manager = setup(4);
    let teams = create_teams(&manager, 4).await;

    let seeded = manager
        .create_tournament(new_tournament("Seeded Cup", &teams[..2]))
        .await
        .unwrap();
    let err = manager
        .delete_tournament(seeded.tournament.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    // Enrolled teams cannot be removed
    let err = manager.delete_team(teams[0].id).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(_)));

    let open = manager
        .create_tournament(new_tournament("Open Cup", &[]))
        .await
        .unwrap();
    manager
        .enroll_team(open.tournament.id, teams[2].id)
        .await
        .unwrap();
    manager.delete_tournament(open.tournament.id).await.unwrap();

    let err = manager
        .get_tournament(open.tournament.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::NotFound { .. }));

    // Enrollment went with the tournament, so the team is free again
    manager.delete_team(teams[2].id).await.unwrap();
    manager.delete_team(teams[3].id).await.unwrap();
    assert_eq!(manager.list_teams().await.unwrap().len(), 2);
}
