// Team-season mean age from player rosters and birth years.
//
// A player appears on a team's roster if any of the Batting, Pitching or
// Fielding tables records a stint for them. A player traded mid-season
// counts toward both teams.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use wsrank_core::{mean, PlayerSeasonKey, TeamSeasonKey};

use crate::lahman::{PersonRecord, Role, StintTable};
use crate::metrics::TeamSeason;

// ---------------------------------------------------------------------------
// Stint aggregation
// ---------------------------------------------------------------------------

/// A stint table collapsed to one row per (year, team, player). Each value is
/// the mean of that column over the player's stints with that team.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStints {
    pub role: Role,
    pub columns: Vec<String>,
    pub rows: BTreeMap<PlayerSeasonKey, Vec<Option<f64>>>,
}

/// Average every numeric column per (year, team, player), skipping missing
/// cells.
pub fn aggregate_stints(table: &StintTable) -> AggregatedStints {
    let mut grouped: BTreeMap<&PlayerSeasonKey, Vec<&Vec<Option<f64>>>> = BTreeMap::new();
    for row in &table.rows {
        grouped.entry(&row.key).or_default().push(&row.values);
    }

    let rows = grouped
        .into_iter()
        .map(|(key, stints)| {
            let means = (0..table.columns.len())
                .map(|col| mean(stints.iter().map(|values| values.get(col).copied().flatten())))
                .collect();
            (key.clone(), means)
        })
        .collect();

    AggregatedStints {
        role: table.role,
        columns: table.columns.clone(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Roster merge
// ---------------------------------------------------------------------------

/// Everything known about one player-season across the three roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterEntry {
    pub roles: BTreeMap<Role, Vec<Option<f64>>>,
}

/// Outer-merge aggregated stint tables on (year, team, player). A key present
/// in any table appears in the result.
pub fn merge_rosters(tables: &[AggregatedStints]) -> BTreeMap<PlayerSeasonKey, RosterEntry> {
    let mut roster: BTreeMap<PlayerSeasonKey, RosterEntry> = BTreeMap::new();
    for table in tables {
        for (key, values) in &table.rows {
            roster
                .entry(key.clone())
                .or_default()
                .roles
                .insert(table.role, values.clone());
        }
    }
    roster
}

// ---------------------------------------------------------------------------
// Ages
// ---------------------------------------------------------------------------

/// Age of each rostered player: season year minus birth year.
///
/// Players absent from the people table are dropped. Players whose birth
/// year is unknown keep a `None` age.
pub fn player_ages(
    roster: &BTreeMap<PlayerSeasonKey, RosterEntry>,
    people: &[PersonRecord],
) -> Vec<(PlayerSeasonKey, Option<f64>)> {
    let birth_years: HashMap<&str, Option<i32>> = people
        .iter()
        .map(|p| (p.player_id.as_str(), p.birth_year))
        .collect();

    roster
        .keys()
        .filter_map(|key| {
            let birth_year = birth_years.get(key.player_id.as_str())?;
            let age = birth_year.map(|born| f64::from(key.year - born));
            Some((key.clone(), age))
        })
        .collect()
}

/// Mean player age per team-season. Team-seasons with no known age are
/// absent from the map.
pub fn team_mean_ages(ages: &[(PlayerSeasonKey, Option<f64>)]) -> BTreeMap<TeamSeasonKey, f64> {
    let mut grouped: BTreeMap<TeamSeasonKey, Vec<Option<f64>>> = BTreeMap::new();
    for (key, age) in ages {
        grouped.entry(key.team_season()).or_default().push(*age);
    }
    let missing = ages.iter().filter(|(_, age)| age.is_none()).count();
    debug!("{} player-seasons without a birth year", missing);

    grouped
        .into_iter()
        .filter_map(|(key, values)| mean(values).map(|m| (key, m)))
        .collect()
}

/// Compute mean team ages straight from the stint tables and people table.
pub fn compute_team_ages(
    stint_tables: &[&StintTable],
    people: &[PersonRecord],
) -> BTreeMap<TeamSeasonKey, f64> {
    let aggregated: Vec<AggregatedStints> = stint_tables.iter().map(|t| aggregate_stints(t)).collect();
    let roster = merge_rosters(&aggregated);
    let ages = player_ages(&roster, people);
    let team_ages = team_mean_ages(&ages);
    info!(
        "computed mean ages for {} team-seasons from {} player-seasons",
        team_ages.len(),
        roster.len()
    );
    team_ages
}

/// Left-join mean ages onto team-seasons by (year, team).
pub fn attach_ages(teams: Vec<TeamSeason>, ages: &BTreeMap<TeamSeasonKey, f64>) -> Vec<TeamSeason> {
    teams
        .into_iter()
        .map(|team| {
            let mean_age = ages.get(&team.key).copied();
            TeamSeason { mean_age, ..team }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
