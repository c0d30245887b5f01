//! Random first-round pairing.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::models::TeamId;

/// Pairs enrolled teams for the first round.
///
/// The random source is owned by the seeder so a fixed seed gives a
/// reproducible bracket.
pub struct BracketSeeder {
    rng: StdRng,
}

impl BracketSeeder {
    /// Create a seeder drawing from operating system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic seeder
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Shuffle the teams and pair neighbours
    ///
    /// # Arguments
    ///
    /// * `team_ids` - Enrolled teams
    ///
    /// # Returns
    ///
    /// * `Vec<(TeamId, TeamId)>` - Slot A / slot B pairs; an odd trailing team is left out
    pub fn pair_teams(&mut self, team_ids: &[TeamId]) -> Vec<(TeamId, TeamId)> {
        if team_ids.is_empty() {
            return Vec::new();
        }

        let mut shuffled = team_ids.to_vec();
        shuffled.shuffle(&mut self.rng);

        shuffled
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }
}

impl Default for BracketSeeder {
    fn default() -> Self {
        Self::new()
    }
}
