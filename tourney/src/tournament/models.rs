//! Request and response models for the tournament service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bracket::{
    BracketError, BracketResult, Enrollment, Match, MatchId, Team, TeamId, Tournament,
    TournamentStatus,
};

/// Shortest accepted name or location
pub const MIN_NAME_LEN: usize = 2;

/// Longest accepted name or location
pub const MAX_NAME_LEN: usize = 255;

/// Tournament creation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    /// Teams to enroll; when present the first round is seeded immediately
    #[serde(default)]
    pub teams: Vec<TeamId>,
}

/// Partial tournament update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<TournamentStatus>,
}

/// Partial team update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub power: Option<f64>,
}

/// Tournament together with its matches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentBracket {
    pub tournament: Tournament,
    pub matches: Vec<Match>,
}

/// Enrollment with the enrolled team resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    /// `None` if the team has since been removed
    pub team: Option<Team>,
}

/// Everything that happened while submitting one match result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultOutcome {
    /// The match as stored after the submission
    pub completed_match: Match,
    /// Match the winner moves on to, if already known
    pub next_match_id: Option<MatchId>,
    /// Round following the completed match
    pub next_round: u32,
    /// Matches created by this submission
    pub generated_matches: Vec<Match>,
    /// Whether this submission completed the tournament
    pub tournament_completed: bool,
    /// Champion, once decided
    pub champion: Option<TeamId>,
    /// Next-round matches with both teams known
    pub ready_matches: Vec<Match>,
}

/// Check a name or location against the length limits
pub fn validate_name(field: &str, value: &str) -> BracketResult<()> {
    let len = value.trim().chars().count();
    if len < MIN_NAME_LEN || len > MAX_NAME_LEN {
        return Err(BracketError::Validation(format!(
            "{field} must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Reject tournament dates before `today`
pub fn validate_date(date: Option<NaiveDate>, today: NaiveDate) -> BracketResult<()> {
    match date {
        Some(date) if date < today => Err(BracketError::Validation(format!(
            "Tournament date {date} is in the past"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("name", "AB").is_ok());
        assert!(validate_name("name", &"x".repeat(255)).is_ok());
        assert!(validate_name("name", "A").is_err());
        assert!(validate_name("name", "  A  ").is_err());
        assert!(validate_name("name", &"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_date() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 5, 9).unwrap();

        assert!(validate_date(None, today).is_ok());
        assert!(validate_date(Some(today), today).is_ok());
        assert!(matches!(
            validate_date(Some(yesterday), today),
            Err(BracketError::Validation(_))
        ));
    }

    #[test]
    fn test_new_tournament_teams_default_to_empty() {
        let parsed: NewTournament =
            serde_json::from_str(r#"{"name": "Cup", "date": "2030-01-01", "location": null}"#)
                .unwrap();
        assert!(parsed.teams.is_empty());
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2030, 1, 1));
    }
}
