// Within-season standardization: percentile ranks and z-scores.
//
// Every statistic is compared only against the teams of the same season.
// Missing values are left out of the season's population and stay missing
// in the output.

use std::collections::BTreeMap;
use std::fmt;
use tracing::info;
use wsrank_core::{compute_pool_stats, compute_zscore, percentile_ranks, PercentileKind, TeamSeasonKey};

use crate::metrics::TeamSeason;
use crate::stat::Stat;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which standardization a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Percentile,
    ZScore,
}

impl Measure {
    pub fn as_str(self) -> &'static str {
        match self {
            Measure::Percentile => "percentile",
            Measure::ZScore => "zscore",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One team-season's standardized statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedRow {
    pub key: TeamSeasonKey,
    pub ws_win: Option<u8>,
    pub values: BTreeMap<Stat, Option<f64>>,
}

impl StandardizedRow {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.values.get(&stat).copied().flatten()
    }
}

/// A table indexed by (year, team), rows sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedTable {
    pub measure: Measure,
    pub stats: Vec<Stat>,
    pub rows: Vec<StandardizedRow>,
}

impl StandardizedTable {
    pub fn row(&self, key: &TeamSeasonKey) -> Option<&StandardizedRow> {
        self.rows
            .binary_search_by(|r| r.key.cmp(key))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Distinct seasons, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.key.year).collect();
        years.dedup();
        years
    }
}

/// The two parallel standardized tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardized {
    pub percentiles: StandardizedTable,
    pub zscores: StandardizedTable,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Group team-seasons by year, ordered by team within each year.
fn group_by_season(teams: &[TeamSeason]) -> BTreeMap<i32, Vec<&TeamSeason>> {
    let mut seasons: BTreeMap<i32, Vec<&TeamSeason>> = BTreeMap::new();
    for team in teams {
        seasons.entry(team.year()).or_default().push(team);
    }
    for members in seasons.values_mut() {
        members.sort_by(|a, b| a.key.cmp(&b.key));
    }
    seasons
}

/// Compute percentile ranks and population z-scores for each statistic,
/// within each season.
pub fn standardize(teams: &[TeamSeason], stats: &[Stat], kind: PercentileKind) -> Standardized {
    let mut pct_rows = Vec::with_capacity(teams.len());
    let mut z_rows = Vec::with_capacity(teams.len());

    let seasons = group_by_season(teams);
    for members in seasons.values() {
        let mut pct_values: Vec<BTreeMap<Stat, Option<f64>>> = vec![BTreeMap::new(); members.len()];
        let mut z_values: Vec<BTreeMap<Stat, Option<f64>>> = vec![BTreeMap::new(); members.len()];

        for &stat in stats {
            let raw: Vec<Option<f64>> = members.iter().map(|t| stat.value(t)).collect();
            let pcts = percentile_ranks(&raw, kind);
            let pool = compute_pool_stats(raw.iter().copied());

            for (i, value) in raw.iter().enumerate() {
                pct_values[i].insert(stat, pcts[i]);
                let z = pool.as_ref().and_then(|p| compute_zscore(*value, p));
                z_values[i].insert(stat, z);
            }
        }

        for ((team, pct), z) in members.iter().zip(pct_values).zip(z_values) {
            pct_rows.push(StandardizedRow {
                key: team.key.clone(),
                ws_win: team.ws_win,
                values: pct,
            });
            z_rows.push(StandardizedRow {
                key: team.key.clone(),
                ws_win: team.ws_win,
                values: z,
            });
        }
    }

    info!(
        "standardized {} statistics for {} team-seasons across {} seasons ({} percentiles)",
        stats.len(),
        pct_rows.len(),
        seasons.len(),
        kind
    );

    Standardized {
        percentiles: StandardizedTable {
            measure: Measure::Percentile,
            stats: stats.to_vec(),
            rows: pct_rows,
        },
        zscores: StandardizedTable {
            measure: Measure::ZScore,
            stats: stats.to_vec(),
            rows: z_rows,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
