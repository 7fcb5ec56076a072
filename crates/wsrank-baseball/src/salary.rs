// Team-season median salary, with team identifier reconciliation.
//
// Salaries.csv does not always key teams the way Teams.csv does: some
// seasons use Baseball-Reference style identifiers (CHC rather than CHN).
// A plain join then loses those teams' salaries. Reconciliation retries the
// lookup under each team's alternate identifier.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use wsrank_core::{median, TeamSeasonKey};

use crate::lahman::SalaryRecord;
use crate::metrics::TeamSeason;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which seasons get the alternate-identifier retry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Every season whose salary table names a team the Teams table does not
    /// know for that year.
    #[default]
    Auto,
    /// Exactly these seasons.
    Seasons(BTreeSet<i32>),
}

/// What the salary join did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalaryReport {
    /// Seasons the reconciliation step ran for.
    pub reconciled_seasons: Vec<i32>,
    /// Team-seasons whose salary was found under the alternate identifier.
    pub backfilled: usize,
    /// Team-seasons in reconciled seasons that still have no salary.
    pub unresolved: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Median salary per (year, team) as keyed in the salary table.
pub fn median_salaries(records: &[SalaryRecord]) -> BTreeMap<TeamSeasonKey, f64> {
    let mut grouped: BTreeMap<TeamSeasonKey, Vec<Option<f64>>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(TeamSeasonKey::new(record.year, record.team_id.clone()))
            .or_default()
            .push(record.salary);
    }
    grouped
        .into_iter()
        .filter_map(|(key, salaries)| median(salaries).map(|m| (key, m)))
        .collect()
}

/// Seasons in which the salary table uses a team identifier that the Teams
/// table does not have for that season.
pub fn mismatched_seasons(teams: &[TeamSeason], medians: &BTreeMap<TeamSeasonKey, f64>) -> BTreeSet<i32> {
    let known: BTreeSet<(i32, &str)> = teams.iter().map(|t| (t.year(), t.team_id())).collect();
    medians
        .keys()
        .filter(|key| !known.contains(&(key.year, key.team_id.as_str())))
        .map(|key| key.year)
        .collect()
}

/// Primary-to-alternate identifier mapping for one season, restricted to
/// teams whose two identifiers differ. An alternate identifier that is
/// another team's primary identifier in the same season is left out.
pub fn reconciliation_map(teams: &[TeamSeason], year: i32) -> BTreeMap<String, String> {
    let season: Vec<&TeamSeason> = teams.iter().filter(|t| t.year() == year).collect();
    let primary: BTreeSet<&str> = season.iter().map(|t| t.team_id()).collect();

    season
        .iter()
        .filter_map(|t| {
            let alt = t.alternate_id()?;
            if primary.contains(alt) {
                debug!(
                    "season {}: alternate id {} of {} is another team's primary id, skipping",
                    year,
                    alt,
                    t.team_id()
                );
                return None;
            }
            Some((t.team_id().to_string(), alt.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Left-join median salaries onto team-seasons, then backfill missing values
/// in the seasons selected by `policy` using the alternate identifier.
pub fn attach_salaries(
    teams: Vec<TeamSeason>,
    medians: &BTreeMap<TeamSeasonKey, f64>,
    policy: &ReconcilePolicy,
) -> (Vec<TeamSeason>, SalaryReport) {
    let mut teams: Vec<TeamSeason> = teams
        .into_iter()
        .map(|team| {
            let median_salary = medians.get(&team.key).copied();
            TeamSeason { median_salary, ..team }
        })
        .collect();

    let present: BTreeSet<i32> = teams.iter().map(|t| t.year()).collect();
    let seasons: BTreeSet<i32> = match policy {
        ReconcilePolicy::Auto => mismatched_seasons(&teams, medians),
        ReconcilePolicy::Seasons(seasons) => seasons.clone(),
    }
    .into_iter()
    .filter(|year| present.contains(year))
    .collect();

    let mut report = SalaryReport {
        reconciled_seasons: seasons.iter().copied().collect(),
        ..SalaryReport::default()
    };

    for &year in &seasons {
        let mapping = reconciliation_map(&teams, year);
        debug!("season {}: {} teams with an alternate identifier", year, mapping.len());

        for team in teams.iter_mut().filter(|t| t.year() == year) {
            if team.median_salary.is_some() {
                continue;
            }
            let backfill = mapping
                .get(team.team_id())
                .and_then(|alt| medians.get(&TeamSeasonKey::new(year, alt.clone())));
            match backfill {
                Some(&salary) => {
                    team.median_salary = Some(salary);
                    report.backfilled += 1;
                }
                None => {
                    warn!("no salary for {} after reconciliation", team.key);
                    report.unresolved += 1;
                }
            }
        }
    }

    info!(
        "joined salaries: {} of {} team-seasons have a median salary ({} backfilled across {} seasons)",
        teams.iter().filter(|t| t.median_salary.is_some()).count(),
        teams.len(),
        report.backfilled,
        report.reconciled_seasons.len()
    );
    (teams, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
