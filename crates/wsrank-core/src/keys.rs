// Composite keys used to group and join season-level tables.

use std::fmt;

/// Identifies one team in one season: the grouping key of every team table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamSeasonKey {
    pub year: i32,
    pub team_id: String,
}

impl TeamSeasonKey {
    pub fn new(year: i32, team_id: impl Into<String>) -> Self {
        TeamSeasonKey {
            year,
            team_id: team_id.into(),
        }
    }
}

impl fmt::Display for TeamSeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.team_id)
    }
}

/// Identifies one player's time with one team in one season. Several stints
/// for the same team collapse onto a single key; a mid-season trade yields
/// two keys that differ only in `team_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerSeasonKey {
    pub year: i32,
    pub team_id: String,
    pub player_id: String,
}

impl PlayerSeasonKey {
    pub fn new(year: i32, team_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        PlayerSeasonKey {
            year,
            team_id: team_id.into(),
            player_id: player_id.into(),
        }
    }

    /// The team-season this player-season belongs to.
    pub fn team_season(&self) -> TeamSeasonKey {
        TeamSeasonKey::new(self.year, self.team_id.clone())
    }
}
