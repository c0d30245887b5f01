//! Next-round planning and champion detection over a snapshot of matches.
//!
//! These functions only look at match state; [`super::BracketEngine`] loads
//! the snapshot, applies the plan and persists the result.

use super::models::{Match, TeamId};

/// Why a round produced no new matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The round has no matches
    EmptyRound,
    /// At least one match still lacks a winner
    Undecided,
    /// The following round already exists
    AlreadyGenerated,
    /// The round is the final
    Final,
}

/// One match of the next round and the two matches feeding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    /// Indices into the current round, in creation order
    pub sources: [usize; 2],
    pub team_a_id: TeamId,
    pub team_b_id: TeamId,
}

/// Outcome of planning the round after `current`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPlan {
    Skip(SkipReason),
    Create(Vec<PlannedMatch>),
}

/// Plan the round following `current`.
///
/// `current` must be in creation order; winners `2i` and `2i+1` meet in the
/// `i`-th new match. A pair missing a winner is left out.
pub fn plan_next_round(current: &[Match], next_round_exists: bool) -> RoundPlan {
    if current.is_empty() {
        return RoundPlan::Skip(SkipReason::EmptyRound);
    }
    if !current.iter().all(Match::is_decided) {
        return RoundPlan::Skip(SkipReason::Undecided);
    }
    if next_round_exists {
        return RoundPlan::Skip(SkipReason::AlreadyGenerated);
    }
    if current.len() == 1 {
        return RoundPlan::Skip(SkipReason::Final);
    }

    let planned = current
        .chunks(2)
        .enumerate()
        .filter_map(|(pair, sources)| match sources {
            [first, second] => Some(PlannedMatch {
                sources: [2 * pair, 2 * pair + 1],
                team_a_id: first.winner_id?,
                team_b_id: second.winner_id?,
            }),
            _ => None,
        })
        .collect();

    RoundPlan::Create(planned)
}

/// The champion of a bracket snapshot.
///
/// The highest round present must hold exactly one match and that match must
/// be decided; anything else means the final has not been played.
pub fn champion(matches: &[Match]) -> Option<TeamId> {
    let last_round = matches.iter().map(|m| m.round).max()?;

    let mut finals = matches.iter().filter(|m| m.round == last_round);
    match (finals.next(), finals.next()) {
        (Some(final_match), None) => final_match.winner_id,
        _ => None,
    }
}
